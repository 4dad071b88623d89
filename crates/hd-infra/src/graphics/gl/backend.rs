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

//! The OpenGL implementation of [`RenderBackend`], built on `glow`.

use super::conversions::{GlTextureFormat, IntoGl};
use super::debug;
use glow::{HasContext, PixelUnpackData};
use hd_core::math::LinearRgba;
use hd_core::platform::RenderWindow;
use hd_core::renderer::api::*;
use hd_core::renderer::{NativeError, RenderBackend, StencilFace};
use std::collections::HashMap;

/// Lowest GL version the backend accepts, as (major, minor).
pub const MIN_GL_VERSION: (u32, u32) = (3, 3);

/// Texture unit used while creating or updating textures, past the units the
/// binding cache tracks.
const SCRATCH_UNIT: u32 = glow::TEXTURE0 + MAX_TEXTURES;

/// `GL_TEXTURE_MAX_ANISOTROPY`, core in 4.6 and `EXT_texture_filter_anisotropic` before.
const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;

fn gl_len(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn gl_dim(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// An OpenGL 3.3+ backend.
///
/// Vertex formats are vertex array objects, so the vertex and index buffer
/// bindings live inside the bound format. Uploads and mappings go through
/// `GL_COPY_WRITE_BUFFER` and texture work through a scratch unit so neither
/// disturbs bindings the cache mirrors.
///
/// Must be used on the thread where the GL context is current.
pub struct GlBackend {
    gl: glow::Context,
    formats: HashMap<glow::VertexArray, Vec<VertexElement>>,
    bound_format: Option<glow::VertexArray>,
}

impl GlBackend {
    /// Wraps an already loaded `glow` context.
    pub fn from_context(gl: glow::Context) -> Result<Self, NativeError> {
        let version = gl.version();
        if (version.major, version.minor) < MIN_GL_VERSION {
            return Err(NativeError::FeatureUnsupported(format!(
                "OpenGL {}.{} or newer is required, the driver provides {}.{}",
                MIN_GL_VERSION.0, MIN_GL_VERSION.1, version.major, version.minor
            )));
        }
        log_driver_info(&gl);
        Ok(Self {
            gl,
            formats: HashMap::new(),
            bound_format: None,
        })
    }

    /// The underlying `glow` context. Calls made through it bypass the binding cache.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn compile_stage(&self, program: &str, stage: ShaderStage, source: &str) -> Result<glow::Shader, NativeError> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage.into_gl())
                .map_err(|reason| NativeError::Allocation { kind: "shader", reason })?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(NativeError::ShaderCompile {
                    program: program.to_owned(),
                    stage: stage.name(),
                    log,
                });
            }
            Ok(shader)
        }
    }

    fn set_capability(&self, capability: u32, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability);
            } else {
                self.gl.disable(capability);
            }
        }
    }
}

fn log_driver_info(gl: &glow::Context) {
    unsafe {
        log::info!(
            "OpenGL driver: {} / {} / {} (GLSL {})",
            gl.get_parameter_string(glow::VENDOR).trim(),
            gl.get_parameter_string(glow::RENDERER).trim(),
            gl.get_parameter_string(glow::VERSION).trim(),
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION).trim()
        );
    }
}

impl RenderBackend for GlBackend {
    type Buffer = glow::Buffer;
    type Texture = glow::Texture;
    type Sampler = glow::Sampler;
    type Program = glow::Program;
    type VertexFormat = glow::VertexArray;

    fn load(window: &dyn RenderWindow) -> Result<Self, NativeError> {
        if window.get_proc_address(c"glGetString").is_null() {
            return Err(NativeError::Loader(format!(
                "window '{}' resolves no GL entry points",
                window.title()
            )));
        }
        let gl = unsafe { glow::Context::from_loader_function_cstr(|symbol| window.get_proc_address(symbol)) };
        Self::from_context(gl)
    }

    fn name(&self) -> &'static str {
        "OpenGL"
    }

    fn vertex_input_owned_by_format(&self) -> bool {
        true
    }

    fn enable_debug_output(&mut self) -> bool {
        if !self.gl.supports_debug() {
            return false;
        }
        unsafe {
            self.gl.enable(glow::DEBUG_OUTPUT);
            self.gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
            self.gl.debug_message_callback(debug::route_message);
        }
        log::debug!("GL debug output routed to the logger");
        true
    }

    // --- Vertex formats ---

    fn create_vertex_format(
        &mut self,
        elements: &[VertexElement],
        current: Option<glow::VertexArray>,
    ) -> Result<glow::VertexArray, NativeError> {
        unsafe {
            let vao = self.gl.create_vertex_array().map_err(|reason| NativeError::Allocation {
                kind: "vertex format",
                reason,
            })?;
            self.gl.bind_vertex_array(Some(vao));
            for element in elements {
                self.gl.enable_vertex_attrib_array(element.index);
                self.gl.vertex_attrib_divisor(element.index, u32::from(element.per_instance));
            }
            self.gl.bind_vertex_array(current);
            self.formats.insert(vao, elements.to_vec());
            Ok(vao)
        }
    }

    fn destroy_vertex_format(&mut self, format: glow::VertexArray) {
        self.formats.remove(&format);
        if self.bound_format == Some(format) {
            self.bound_format = None;
        }
        unsafe { self.gl.delete_vertex_array(format) };
    }

    fn bind_vertex_format(&mut self, format: Option<glow::VertexArray>) {
        self.bound_format = format;
        unsafe { self.gl.bind_vertex_array(format) };
    }

    // --- Buffers ---

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> Result<glow::Buffer, NativeError> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(|reason| NativeError::Allocation {
            kind: kind.name(),
            reason,
        })?;
        self.buffer_data(kind, buffer, data, size, usage)?;
        Ok(buffer)
    }

    fn destroy_buffer(&mut self, _kind: BufferKind, buffer: glow::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn buffer_data(
        &mut self,
        _kind: BufferKind,
        buffer: glow::Buffer,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> Result<(), NativeError> {
        unsafe {
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(buffer));
            match data {
                Some(bytes) => self.gl.buffer_data_u8_slice(glow::COPY_WRITE_BUFFER, bytes, usage.into_gl()),
                None => self.gl.buffer_data_size(glow::COPY_WRITE_BUFFER, gl_len(size), usage.into_gl()),
            }
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
        Ok(())
    }

    fn buffer_sub_data(&mut self, _kind: BufferKind, buffer: glow::Buffer, offset: usize, data: &[u8]) {
        unsafe {
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(buffer));
            self.gl.buffer_sub_data_u8_slice(glow::COPY_WRITE_BUFFER, gl_len(offset), data);
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
    }

    fn map_buffer(
        &mut self,
        kind: BufferKind,
        buffer: glow::Buffer,
        size: usize,
        access: BufferAccess,
        f: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), NativeError> {
        unsafe {
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(buffer));
            let ptr = self
                .gl
                .map_buffer_range(glow::COPY_WRITE_BUFFER, 0, gl_len(size), access.into_gl());
            if ptr.is_null() {
                self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
                return Err(NativeError::Allocation {
                    kind: kind.name(),
                    reason: "glMapBufferRange returned null".to_owned(),
                });
            }
            let mapped = std::slice::from_raw_parts_mut(ptr, size);
            if access.writable() {
                f(mapped);
            } else {
                // A read-only mapping may live in read-only pages.
                let mut copy = mapped.to_vec();
                f(&mut copy);
            }
            self.gl.unmap_buffer(glow::COPY_WRITE_BUFFER);
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: Option<glow::Buffer>, offset: u32, stride: u32) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer);
            if buffer.is_none() {
                return;
            }
            let Some(elements) = self.bound_format.and_then(|format| self.formats.get(&format)) else {
                log::warn!("Vertex buffer bound to slot {slot} without a vertex format");
                return;
            };
            for element in elements.iter().filter(|element| element.slot == slot) {
                self.gl.vertex_attrib_pointer_f32(
                    element.index,
                    gl_dim(element.element_type.component_count()),
                    glow::FLOAT,
                    element.normalized,
                    gl_dim(stride),
                    gl_dim(offset.saturating_add(element.offset)),
                );
            }
        }
    }

    fn bind_index_buffer(&mut self, buffer: Option<glow::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer) };
    }

    fn bind_constant_buffer(&mut self, slot: u32, buffer: Option<glow::Buffer>) {
        unsafe { self.gl.bind_buffer_base(glow::UNIFORM_BUFFER, slot, buffer) };
    }

    // --- Textures and samplers ---

    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<glow::Texture, NativeError> {
        let format: GlTextureFormat = desc.format.into_gl();
        let target = desc.kind.into_gl();
        unsafe {
            let texture = self.gl.create_texture().map_err(|reason| NativeError::Allocation {
                kind: "texture",
                reason,
            })?;
            self.gl.active_texture(SCRATCH_UNIT);
            self.gl.bind_texture(target, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            match desc.kind {
                TextureKind::Texture2D => self.gl.tex_image_2d(
                    target,
                    0,
                    format.internal,
                    gl_dim(desc.width),
                    gl_dim(desc.height),
                    0,
                    format.external,
                    format.data_type,
                    PixelUnpackData::Slice(data),
                ),
                TextureKind::Texture2DArray => self.gl.tex_image_3d(
                    target,
                    0,
                    format.internal,
                    gl_dim(desc.width),
                    gl_dim(desc.height),
                    gl_dim(desc.layers),
                    0,
                    format.external,
                    format.data_type,
                    PixelUnpackData::Slice(data),
                ),
            }
            if !desc.format.is_depth() {
                self.gl.generate_mipmap(target);
            }
            self.gl.bind_texture(target, None);
            Ok(texture)
        }
    }

    fn set_texture_layer(&mut self, texture: glow::Texture, desc: &TextureDesc, layer: u32, data: &[u8]) {
        let format: GlTextureFormat = desc.format.into_gl();
        unsafe {
            self.gl.active_texture(SCRATCH_UNIT);
            self.gl.bind_texture(glow::TEXTURE_2D_ARRAY, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_sub_image_3d(
                glow::TEXTURE_2D_ARRAY,
                0,
                0,
                0,
                gl_dim(layer),
                gl_dim(desc.width),
                gl_dim(desc.height),
                1,
                format.external,
                format.data_type,
                PixelUnpackData::Slice(Some(data)),
            );
            if !desc.format.is_depth() {
                self.gl.generate_mipmap(glow::TEXTURE_2D_ARRAY);
            }
            self.gl.bind_texture(glow::TEXTURE_2D_ARRAY, None);
        }
    }

    fn destroy_texture(&mut self, texture: glow::Texture) {
        unsafe { self.gl.delete_texture(texture) };
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: Option<glow::Texture>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(kind.into_gl(), texture);
        }
    }

    fn create_sampler(&mut self, desc: &SamplerDesc, filter: &NativeFilter) -> Result<glow::Sampler, NativeError> {
        let (min, mag) = (*filter).into_gl();
        let mut border = desc.border_color.to_array();
        unsafe {
            let sampler = self.gl.create_sampler().map_err(|reason| NativeError::Allocation {
                kind: "sampler state",
                reason,
            })?;
            self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_MIN_FILTER, min);
            self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_MAG_FILTER, mag);
            self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_WRAP_S, desc.address_u.into_gl());
            self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_WRAP_T, desc.address_v.into_gl());
            self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_WRAP_R, desc.address_w.into_gl());
            if filter.comparison {
                self.gl
                    .sampler_parameter_i32(sampler, glow::TEXTURE_COMPARE_MODE, glow::COMPARE_REF_TO_TEXTURE as i32);
                let func: u32 = desc.compare_func.into_gl();
                self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_COMPARE_FUNC, func as i32);
            } else {
                self.gl.sampler_parameter_i32(sampler, glow::TEXTURE_COMPARE_MODE, glow::NONE as i32);
            }
            self.gl.sampler_parameter_f32(sampler, glow::TEXTURE_LOD_BIAS, desc.lod_bias);
            self.gl.sampler_parameter_f32_slice(sampler, glow::TEXTURE_BORDER_COLOR, &mut border);
            self.gl.sampler_parameter_f32(sampler, glow::TEXTURE_MIN_LOD, desc.min_lod);
            self.gl.sampler_parameter_f32(sampler, glow::TEXTURE_MAX_LOD, desc.max_lod);
            if filter.anisotropic {
                self.gl
                    .sampler_parameter_f32(sampler, TEXTURE_MAX_ANISOTROPY, desc.max_anisotropy as f32);
            }
            Ok(sampler)
        }
    }

    fn destroy_sampler(&mut self, sampler: glow::Sampler) {
        unsafe { self.gl.delete_sampler(sampler) };
    }

    fn bind_sampler(&mut self, unit: u32, sampler: Option<glow::Sampler>) {
        unsafe { self.gl.bind_sampler(unit, sampler) };
    }

    // --- Programs ---

    fn create_program(&mut self, name: &str, vertex: &str, pixel: &str) -> Result<glow::Program, NativeError> {
        let vs = self.compile_stage(name, ShaderStage::Vertex, vertex)?;
        let ps = match self.compile_stage(name, ShaderStage::Pixel, pixel) {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(err);
            }
        };
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(reason) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(ps);
                    return Err(NativeError::Allocation { kind: "program", reason });
                }
            };
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, ps);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, ps);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(ps);

            let log = self.gl.get_program_info_log(program);
            if !self.gl.get_program_link_status(program) {
                self.gl.delete_program(program);
                return Err(NativeError::ProgramLink {
                    program: name.to_owned(),
                    log,
                });
            }
            if !log.trim().is_empty() {
                log::warn!("Program '{name}' linked with messages:\n{log}");
            }

            self.gl.validate_program(program);
            if !self.gl.get_program_validate_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(NativeError::ProgramValidate {
                    program: name.to_owned(),
                    log,
                });
            }
            Ok(program)
        }
    }

    fn destroy_program(&mut self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn bind_program(&mut self, program: Option<glow::Program>) {
        unsafe { self.gl.use_program(program) };
    }

    fn constant_location(&mut self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_uniform_location(program, name) }.map(|location| location.0)
    }

    fn set_constant(&mut self, location: u32, value: ConstantValue<'_>) {
        let location = glow::NativeUniformLocation(location);
        let at = Some(&location);
        unsafe {
            match value {
                ConstantValue::Int(v) => self.gl.uniform_1_i32(at, v),
                ConstantValue::Float(v) => self.gl.uniform_1_f32(at, v),
                ConstantValue::Vec2(v) => self.gl.uniform_2_f32_slice(at, &v),
                ConstantValue::Vec3(v) => self.gl.uniform_3_f32_slice(at, &v),
                ConstantValue::Vec4(v) => self.gl.uniform_4_f32_slice(at, &v),
                ConstantValue::Mat4(v) => self.gl.uniform_matrix_4_f32_slice(at, false, &v),
                ConstantValue::IntArray(v) => self.gl.uniform_1_i32_slice(at, v),
                ConstantValue::FloatArray(v) => self.gl.uniform_1_f32_slice(at, v),
                ConstantValue::Vec2Array(v) => self.gl.uniform_2_f32_slice(at, bytemuck::cast_slice(v)),
                ConstantValue::Vec3Array(v) => self.gl.uniform_3_f32_slice(at, bytemuck::cast_slice(v)),
                ConstantValue::Vec4Array(v) => self.gl.uniform_4_f32_slice(at, bytemuck::cast_slice(v)),
                ConstantValue::Mat4Array(v) => self.gl.uniform_matrix_4_f32_slice(at, false, bytemuck::cast_slice(v)),
            }
        }
    }

    // --- Fixed-function state ---

    fn set_depth_test(&mut self, enabled: bool) {
        self.set_capability(glow::DEPTH_TEST, enabled);
    }

    fn set_depth_func(&mut self, func: CompareFunc) {
        unsafe { self.gl.depth_func(func.into_gl()) };
    }

    fn set_depth_mask(&mut self, write: bool) {
        unsafe { self.gl.depth_mask(write) };
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.set_capability(glow::STENCIL_TEST, enabled);
    }

    fn set_stencil_func(&mut self, front: CompareFunc, back: CompareFunc, reference: i32, read_mask: u32) {
        unsafe {
            self.gl
                .stencil_func_separate(glow::FRONT, front.into_gl(), reference, read_mask);
            self.gl.stencil_func_separate(glow::BACK, back.into_gl(), reference, read_mask);
        }
    }

    fn set_stencil_op(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        unsafe {
            self.gl
                .stencil_op_separate(face.into_gl(), fail.into_gl(), depth_fail.into_gl(), pass.into_gl());
        }
    }

    fn set_stencil_write_mask(&mut self, mask: u32) {
        unsafe { self.gl.stencil_mask(mask) };
    }

    fn set_blend_enabled(&mut self, enabled: bool) {
        self.set_capability(glow::BLEND, enabled);
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor, src_alpha: BlendFactor, dst_alpha: BlendFactor) {
        unsafe {
            self.gl
                .blend_func_separate(src.into_gl(), dst.into_gl(), src_alpha.into_gl(), dst_alpha.into_gl());
        }
    }

    fn set_blend_op(&mut self, op: BlendOp, op_alpha: BlendOp) {
        unsafe { self.gl.blend_equation_separate(op.into_gl(), op_alpha.into_gl()) };
    }

    fn set_blend_constant(&mut self, color: LinearRgba) {
        unsafe { self.gl.blend_color(color.r, color.g, color.b, color.a) };
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        unsafe { self.gl.color_mask(mask.r, mask.g, mask.b, mask.a) };
    }

    fn set_cull_face(&mut self, cull: CullFace) {
        let face: Option<u32> = cull.into_gl();
        match face {
            Some(face) => unsafe {
                self.gl.enable(glow::CULL_FACE);
                self.gl.cull_face(face);
            },
            None => self.set_capability(glow::CULL_FACE, false),
        }
    }

    fn set_fill_mode(&mut self, fill: FillMode) {
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, fill.into_gl()) };
    }

    fn set_front_face(&mut self, front: FrontFace) {
        unsafe { self.gl.front_face(front.into_gl()) };
    }

    fn set_polygon_offset(&mut self, offset: PolygonOffset) {
        self.set_capability(glow::POLYGON_OFFSET_FILL, offset.enabled);
        if offset.enabled {
            unsafe { self.gl.polygon_offset(offset.factor, offset.units) };
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl
                .viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        }
    }

    // --- Clears ---

    fn clear_color(&mut self, color: LinearRgba) {
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe {
            self.gl.clear_depth_f32(depth);
            self.gl.clear(glow::DEPTH_BUFFER_BIT);
        }
    }

    fn clear_stencil(&mut self, value: i32) {
        unsafe {
            self.gl.clear_stencil(value);
            self.gl.clear(glow::STENCIL_BUFFER_BIT);
        }
    }

    fn clear_depth_stencil(&mut self, depth: f32, stencil: i32) {
        unsafe {
            self.gl.clear_depth_f32(depth);
            self.gl.clear_stencil(stencil);
            self.gl.clear(glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT);
        }
    }

    // --- Draws ---

    fn draw(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32) {
        unsafe {
            self.gl
                .draw_arrays(primitive.into_gl(), gl_dim(first_vertex), gl_dim(vertex_count));
        }
    }

    fn draw_instanced(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32, instance_count: u32) {
        unsafe {
            self.gl.draw_arrays_instanced(
                primitive.into_gl(),
                gl_dim(first_vertex),
                gl_dim(vertex_count),
                gl_dim(instance_count),
            );
        }
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, index_type: IndexType, first_index: u32, index_count: u32) {
        let offset = first_index as usize * index_type.size();
        unsafe {
            self.gl
                .draw_elements(primitive.into_gl(), gl_dim(index_count), index_type.into_gl(), gl_len(offset));
        }
    }

    fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        index_type: IndexType,
        first_index: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        let offset = first_index as usize * index_type.size();
        unsafe {
            self.gl.draw_elements_instanced(
                primitive.into_gl(),
                gl_dim(index_count),
                index_type.into_gl(),
                gl_len(offset),
                gl_dim(instance_count),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_saturate_instead_of_wrapping() {
        assert_eq!(gl_len(64), 64);
        assert_eq!(gl_len(usize::MAX), i32::MAX);
        assert_eq!(gl_dim(u32::MAX), i32::MAX);
    }

    #[test]
    fn scratch_unit_is_past_the_cached_units() {
        assert_eq!(SCRATCH_UNIT - glow::TEXTURE0, MAX_TEXTURES);
    }
}
