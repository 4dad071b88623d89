// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A backend without a GPU.
//!
//! [`HeadlessBackend`] keeps buffer and texture contents in memory and records
//! every native call it receives, in order. It is what the integration tests
//! drive the render context with, and it is usable by tools that want to
//! exercise rendering code on machines without a display.

use crate::config::ContextSettings;
use crate::math::LinearRgba;
use crate::platform::RenderWindow;
use crate::renderer::api::*;
use crate::renderer::error::NativeError;
use crate::renderer::traits::{RenderBackend, StencilFace};
use std::collections::HashMap;
use std::ffi::{c_void, CStr};

/// One call received by a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum NativeCall {
    EnableDebugOutput,
    CreateVertexFormat { id: u32, elements: usize },
    DestroyVertexFormat(u32),
    BindVertexFormat(Option<u32>),
    CreateBuffer { id: u32, kind: BufferKind, size: usize, usage: BufferUsage },
    DestroyBuffer(u32),
    BufferData { id: u32, size: usize },
    BufferSubData { id: u32, offset: usize, size: usize },
    MapBuffer { id: u32, access: BufferAccess },
    BindVertexBuffer { slot: u32, buffer: Option<u32>, offset: u32, stride: u32 },
    BindIndexBuffer(Option<u32>),
    BindConstantBuffer { slot: u32, buffer: Option<u32> },
    CreateTexture { id: u32, desc: TextureDesc },
    SetTextureLayer { id: u32, layer: u32 },
    DestroyTexture(u32),
    BindTexture { unit: u32, kind: TextureKind, texture: Option<u32> },
    CreateSampler { id: u32, filter: NativeFilter },
    DestroySampler(u32),
    BindSampler { unit: u32, sampler: Option<u32> },
    CreateProgram { id: u32, name: String },
    DestroyProgram(u32),
    BindProgram(Option<u32>),
    SetConstant { location: u32, count: usize },
    DepthTest(bool),
    DepthFunc(CompareFunc),
    DepthMask(bool),
    StencilTest(bool),
    StencilFunc { front: CompareFunc, back: CompareFunc, reference: i32, read_mask: u32 },
    StencilOp { face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp },
    StencilWriteMask(u32),
    BlendEnabled(bool),
    BlendFunc { src: BlendFactor, dst: BlendFactor, src_alpha: BlendFactor, dst_alpha: BlendFactor },
    BlendOp { op: BlendOp, op_alpha: BlendOp },
    BlendConstant(LinearRgba),
    ColorMask(ColorMask),
    CullFace(CullFace),
    FillMode(FillMode),
    FrontFace(FrontFace),
    PolygonOffset(PolygonOffset),
    Viewport(Viewport),
    ClearColor(LinearRgba),
    ClearDepth(f32),
    ClearStencil(i32),
    ClearDepthStencil(f32, i32),
    Draw { primitive: PrimitiveType, first: u32, count: u32, instances: Option<u32> },
    DrawIndexed { primitive: PrimitiveType, index_type: IndexType, first: u32, count: u32, instances: Option<u32> },
}

#[derive(Debug)]
struct ProgramObject {
    constants: Vec<String>,
}

/// An in-memory [`RenderBackend`] that records every call.
#[derive(Debug)]
pub struct HeadlessBackend {
    next_id: u32,
    owns_vertex_input: bool,
    validation_failure: Option<String>,
    calls: Vec<NativeCall>,
    buffers: HashMap<u32, Vec<u8>>,
    textures: HashMap<u32, (TextureDesc, Vec<u8>)>,
    samplers: HashMap<u32, NativeFilter>,
    formats: HashMap<u32, Vec<VertexElement>>,
    programs: HashMap<u32, ProgramObject>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Creates a backend whose vertex formats own their buffer bindings, like
    /// GL vertex array objects.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            owns_vertex_input: true,
            validation_failure: None,
            calls: Vec::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            samplers: HashMap::new(),
            formats: HashMap::new(),
            programs: HashMap::new(),
        }
    }

    /// Chooses whether vertex formats own their buffer bindings.
    pub fn with_vertex_input_owned_by_format(mut self, owned: bool) -> Self {
        self.owns_vertex_input = owned;
        self
    }

    /// Makes every linked program fail validation with `log`.
    pub fn with_validation_failure(mut self, log: impl Into<String>) -> Self {
        self.validation_failure = Some(log.into());
        self
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Contents of a live buffer.
    pub fn buffer_contents(&self, id: u32) -> Option<&[u8]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    /// Contents of a live texture, every layer back to back.
    pub fn texture_contents(&self, id: u32) -> Option<&[u8]> {
        self.textures.get(&id).map(|(_, data)| data.as_slice())
    }

    /// Number of native objects still alive.
    pub fn live_objects(&self) -> usize {
        self.buffers.len() + self.textures.len() + self.samplers.len() + self.formats.len() + self.programs.len()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, call: NativeCall) {
        log::trace!("headless: {call:?}");
        self.calls.push(call);
    }
}

/// Checks a stage the way a very small compiler would: balanced delimiters and a `main`.
fn compile_stage(program: &str, stage: ShaderStage, source: &str) -> Result<(), NativeError> {
    let fail = |log: String| NativeError::ShaderCompile {
        program: program.to_owned(),
        stage: stage.name(),
        log,
    };

    let mut depth: Vec<(char, usize)> = Vec::new();
    for (number, line) in source.lines().enumerate() {
        let line = line.split("//").next().unwrap_or_default();
        for c in line.chars() {
            match c {
                '{' | '(' | '[' => depth.push((c, number + 1)),
                '}' | ')' | ']' => {
                    let expected = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match depth.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => return Err(fail(format!("0:{}: error: unexpected '{c}'", number + 1))),
                    }
                }
                _ => {}
            }
        }
    }
    if let Some((open, line)) = depth.pop() {
        return Err(fail(format!("0:{line}: error: unclosed '{open}'")));
    }
    if !source.contains("main") {
        return Err(fail("0:0: error: missing entry point 'main'".to_owned()));
    }
    Ok(())
}

/// Collects the names declared with `uniform <type> <name>;`.
fn declared_constants(source: &str, out: &mut Vec<String>) {
    for line in source.lines() {
        let mut words = line.split_whitespace();
        if words.next() != Some("uniform") {
            continue;
        }
        let Some(name) = words.nth(1) else { continue };
        let name = name.trim_end_matches(';');
        let name = name.split('[').next().unwrap_or(name);
        if !name.is_empty() && !out.iter().any(|known| known == name) {
            out.push(name.to_owned());
        }
    }
}

impl RenderBackend for HeadlessBackend {
    type Buffer = u32;
    type Texture = u32;
    type Sampler = u32;
    type Program = u32;
    type VertexFormat = u32;

    fn load(window: &dyn RenderWindow) -> Result<Self, NativeError> {
        if !window.has_graphics_context() {
            return Err(NativeError::ContextUnavailable(window.title().to_owned()));
        }
        Ok(Self::new())
    }

    fn name(&self) -> &'static str {
        "headless"
    }

    fn vertex_input_owned_by_format(&self) -> bool {
        self.owns_vertex_input
    }

    fn enable_debug_output(&mut self) -> bool {
        self.record(NativeCall::EnableDebugOutput);
        true
    }

    fn create_vertex_format(
        &mut self,
        elements: &[VertexElement],
        _current: Option<u32>,
    ) -> Result<u32, NativeError> {
        let id = self.allocate();
        self.formats.insert(id, elements.to_vec());
        self.record(NativeCall::CreateVertexFormat {
            id,
            elements: elements.len(),
        });
        Ok(id)
    }

    fn destroy_vertex_format(&mut self, format: u32) {
        self.formats.remove(&format);
        self.record(NativeCall::DestroyVertexFormat(format));
    }

    fn bind_vertex_format(&mut self, format: Option<u32>) {
        self.record(NativeCall::BindVertexFormat(format));
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> Result<u32, NativeError> {
        let id = self.allocate();
        let contents = data.map_or_else(|| vec![0; size], <[u8]>::to_vec);
        self.buffers.insert(id, contents);
        self.record(NativeCall::CreateBuffer { id, kind, size, usage });
        Ok(id)
    }

    fn destroy_buffer(&mut self, _kind: BufferKind, buffer: u32) {
        self.buffers.remove(&buffer);
        self.record(NativeCall::DestroyBuffer(buffer));
    }

    fn buffer_data(
        &mut self,
        _kind: BufferKind,
        buffer: u32,
        data: Option<&[u8]>,
        size: usize,
        _usage: BufferUsage,
    ) -> Result<(), NativeError> {
        let contents = data.map_or_else(|| vec![0; size], <[u8]>::to_vec);
        self.buffers.insert(buffer, contents);
        self.record(NativeCall::BufferData { id: buffer, size });
        Ok(())
    }

    fn buffer_sub_data(&mut self, _kind: BufferKind, buffer: u32, offset: usize, data: &[u8]) {
        if let Some(contents) = self.buffers.get_mut(&buffer) {
            contents[offset..offset + data.len()].copy_from_slice(data);
        }
        self.record(NativeCall::BufferSubData {
            id: buffer,
            offset,
            size: data.len(),
        });
    }

    fn map_buffer(
        &mut self,
        kind: BufferKind,
        buffer: u32,
        size: usize,
        access: BufferAccess,
        f: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), NativeError> {
        let contents = self.buffers.get_mut(&buffer).ok_or_else(|| NativeError::Allocation {
            kind: kind.name(),
            reason: format!("buffer {buffer} has no storage"),
        })?;
        if access.writable() {
            f(&mut contents[..size]);
        } else {
            // Writes through a read-only mapping never reach the buffer.
            let mut copy = contents[..size].to_vec();
            f(&mut copy);
        }
        self.record(NativeCall::MapBuffer { id: buffer, access });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: Option<u32>, offset: u32, stride: u32) {
        self.record(NativeCall::BindVertexBuffer {
            slot,
            buffer,
            offset,
            stride,
        });
    }

    fn bind_index_buffer(&mut self, buffer: Option<u32>) {
        self.record(NativeCall::BindIndexBuffer(buffer));
    }

    fn bind_constant_buffer(&mut self, slot: u32, buffer: Option<u32>) {
        self.record(NativeCall::BindConstantBuffer { slot, buffer });
    }

    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<u32, NativeError> {
        let id = self.allocate();
        let contents = data.map_or_else(|| vec![0; desc.total_size().unwrap_or_default()], <[u8]>::to_vec);
        self.textures.insert(id, (*desc, contents));
        self.record(NativeCall::CreateTexture { id, desc: *desc });
        Ok(id)
    }

    fn set_texture_layer(&mut self, texture: u32, desc: &TextureDesc, layer: u32, data: &[u8]) {
        if let Some((_, contents)) = self.textures.get_mut(&texture) {
            let start = desc.layer_size().unwrap_or_default() * layer as usize;
            contents[start..start + data.len()].copy_from_slice(data);
        }
        self.record(NativeCall::SetTextureLayer { id: texture, layer });
    }

    fn destroy_texture(&mut self, texture: u32) {
        self.textures.remove(&texture);
        self.record(NativeCall::DestroyTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: Option<u32>) {
        self.record(NativeCall::BindTexture { unit, kind, texture });
    }

    fn create_sampler(&mut self, _desc: &SamplerDesc, filter: &NativeFilter) -> Result<u32, NativeError> {
        let id = self.allocate();
        self.samplers.insert(id, *filter);
        self.record(NativeCall::CreateSampler { id, filter: *filter });
        Ok(id)
    }

    fn destroy_sampler(&mut self, sampler: u32) {
        self.samplers.remove(&sampler);
        self.record(NativeCall::DestroySampler(sampler));
    }

    fn bind_sampler(&mut self, unit: u32, sampler: Option<u32>) {
        self.record(NativeCall::BindSampler { unit, sampler });
    }

    fn create_program(&mut self, name: &str, vertex: &str, pixel: &str) -> Result<u32, NativeError> {
        compile_stage(name, ShaderStage::Vertex, vertex)?;
        compile_stage(name, ShaderStage::Pixel, pixel)?;
        if let Some(log) = &self.validation_failure {
            return Err(NativeError::ProgramValidate {
                program: name.to_owned(),
                log: log.clone(),
            });
        }

        let mut constants = Vec::new();
        declared_constants(vertex, &mut constants);
        declared_constants(pixel, &mut constants);

        let id = self.allocate();
        self.programs.insert(id, ProgramObject { constants });
        self.record(NativeCall::CreateProgram {
            id,
            name: name.to_owned(),
        });
        Ok(id)
    }

    fn destroy_program(&mut self, program: u32) {
        self.programs.remove(&program);
        self.record(NativeCall::DestroyProgram(program));
    }

    fn bind_program(&mut self, program: Option<u32>) {
        self.record(NativeCall::BindProgram(program));
    }

    fn constant_location(&mut self, program: u32, name: &str) -> Option<u32> {
        let object = self.programs.get(&program)?;
        let index = object.constants.iter().position(|known| known == name)?;
        u32::try_from(index).ok()
    }

    fn set_constant(&mut self, location: u32, value: ConstantValue<'_>) {
        self.record(NativeCall::SetConstant {
            location,
            count: value.count(),
        });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(NativeCall::DepthTest(enabled));
    }

    fn set_depth_func(&mut self, func: CompareFunc) {
        self.record(NativeCall::DepthFunc(func));
    }

    fn set_depth_mask(&mut self, write: bool) {
        self.record(NativeCall::DepthMask(write));
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.record(NativeCall::StencilTest(enabled));
    }

    fn set_stencil_func(&mut self, front: CompareFunc, back: CompareFunc, reference: i32, read_mask: u32) {
        self.record(NativeCall::StencilFunc {
            front,
            back,
            reference,
            read_mask,
        });
    }

    fn set_stencil_op(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.record(NativeCall::StencilOp {
            face,
            fail,
            depth_fail,
            pass,
        });
    }

    fn set_stencil_write_mask(&mut self, mask: u32) {
        self.record(NativeCall::StencilWriteMask(mask));
    }

    fn set_blend_enabled(&mut self, enabled: bool) {
        self.record(NativeCall::BlendEnabled(enabled));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor, src_alpha: BlendFactor, dst_alpha: BlendFactor) {
        self.record(NativeCall::BlendFunc {
            src,
            dst,
            src_alpha,
            dst_alpha,
        });
    }

    fn set_blend_op(&mut self, op: BlendOp, op_alpha: BlendOp) {
        self.record(NativeCall::BlendOp { op, op_alpha });
    }

    fn set_blend_constant(&mut self, color: LinearRgba) {
        self.record(NativeCall::BlendConstant(color));
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.record(NativeCall::ColorMask(mask));
    }

    fn set_cull_face(&mut self, cull: CullFace) {
        self.record(NativeCall::CullFace(cull));
    }

    fn set_fill_mode(&mut self, fill: FillMode) {
        self.record(NativeCall::FillMode(fill));
    }

    fn set_front_face(&mut self, front: FrontFace) {
        self.record(NativeCall::FrontFace(front));
    }

    fn set_polygon_offset(&mut self, offset: PolygonOffset) {
        self.record(NativeCall::PolygonOffset(offset));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record(NativeCall::Viewport(viewport));
    }

    fn clear_color(&mut self, color: LinearRgba) {
        self.record(NativeCall::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(NativeCall::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, value: i32) {
        self.record(NativeCall::ClearStencil(value));
    }

    fn clear_depth_stencil(&mut self, depth: f32, stencil: i32) {
        self.record(NativeCall::ClearDepthStencil(depth, stencil));
    }

    fn draw(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32) {
        self.record(NativeCall::Draw {
            primitive,
            first: first_vertex,
            count: vertex_count,
            instances: None,
        });
    }

    fn draw_instanced(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32, instance_count: u32) {
        self.record(NativeCall::Draw {
            primitive,
            first: first_vertex,
            count: vertex_count,
            instances: Some(instance_count),
        });
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, index_type: IndexType, first_index: u32, index_count: u32) {
        self.record(NativeCall::DrawIndexed {
            primitive,
            index_type,
            first: first_index,
            count: index_count,
            instances: None,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        index_type: IndexType,
        first_index: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        self.record(NativeCall::DrawIndexed {
            primitive,
            index_type,
            first: first_index,
            count: index_count,
            instances: Some(instance_count),
        });
    }
}

/// A window stand-in for headless rendering.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    title: String,
    size: (u32, u32),
    settings: Option<ContextSettings>,
}

impl HeadlessWindow {
    /// A window with a default graphics context.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            size: (width, height),
            settings: Some(ContextSettings::default()),
        }
    }

    /// Replaces the context settings; `None` simulates a window without a context.
    pub fn with_context_settings(mut self, settings: Option<ContextSettings>) -> Self {
        self.settings = settings;
        self
    }
}

impl RenderWindow for HeadlessWindow {
    fn title(&self) -> &str {
        &self.title
    }

    fn inner_size(&self) -> (u32, u32) {
        self.size
    }

    fn context_settings(&self) -> Option<&ContextSettings> {
        self.settings.as_ref()
    }

    fn get_proc_address(&self, _symbol: &CStr) -> *const c_void {
        std::ptr::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_rejects_unbalanced_braces() {
        let err = compile_stage("broken", ShaderStage::Pixel, "void main() {\n  x = 1;\n").unwrap_err();
        match err {
            NativeError::ShaderCompile { program, stage, log } => {
                assert_eq!(program, "broken");
                assert_eq!(stage, "pixel");
                assert!(log.contains("0:1: error: unclosed '{'"), "{log}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn compile_rejects_stray_closer() {
        let err = compile_stage("p", ShaderStage::Vertex, "void main() }\n").unwrap_err();
        assert!(err.to_string().contains("unexpected '}'"));
    }

    #[test]
    fn compile_accepts_valid_source() {
        assert!(compile_stage("ok", ShaderStage::Vertex, "void main() { gl_Position = vec4(0.0); }").is_ok());
    }

    #[test]
    fn constants_are_located_in_declaration_order() {
        let mut backend = HeadlessBackend::new();
        let vs = "uniform mat4 uMvp;\nuniform vec4 uTint[4];\nvoid main() {}\n";
        let ps = "uniform sampler2D uTex;\nuniform vec4 uTint[4];\nvoid main() {}\n";
        let program = backend.create_program("p", vs, ps).unwrap();
        assert_eq!(backend.constant_location(program, "uMvp"), Some(0));
        assert_eq!(backend.constant_location(program, "uTint"), Some(1));
        assert_eq!(backend.constant_location(program, "uTex"), Some(2));
        assert_eq!(backend.constant_location(program, "missing"), None);
    }

    #[test]
    fn read_only_mapping_does_not_write_back() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend
            .create_buffer(BufferKind::Vertex, Some(&[1, 2, 3, 4]), 4, BufferUsage::Dynamic)
            .unwrap();
        backend
            .map_buffer(BufferKind::Vertex, buffer, 4, BufferAccess::Read, &mut |bytes| bytes.fill(9))
            .unwrap();
        assert_eq!(backend.buffer_contents(buffer), Some(&[1, 2, 3, 4][..]));
        backend
            .map_buffer(BufferKind::Vertex, buffer, 4, BufferAccess::Write, &mut |bytes| bytes.fill(9))
            .unwrap();
        assert_eq!(backend.buffer_contents(buffer), Some(&[9, 9, 9, 9][..]));
    }

    #[test]
    fn load_requires_a_context() {
        let window = HeadlessWindow::new("no context", 8, 8).with_context_settings(None);
        assert!(matches!(
            HeadlessBackend::load(&window),
            Err(NativeError::ContextUnavailable(title)) if title == "no context"
        ));
    }
}
