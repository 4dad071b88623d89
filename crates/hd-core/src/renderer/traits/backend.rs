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

//! The [`RenderBackend`] trait and the per-face stencil selector.

use crate::math::LinearRgba;
use crate::platform::RenderWindow;
use crate::renderer::api::*;
use crate::renderer::error::NativeError;
use std::fmt::Debug;

/// Selects the face a stencil operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFace {
    /// Front-facing polygons.
    Front,
    /// Back-facing polygons.
    Back,
}

/// A native graphics API, seen from the render context.
///
/// Implementations are thin: they translate portable values into native calls
/// and own nothing beyond the native objects they hand out. Validation,
/// lifetime tracking and redundant-call elimination all live in
/// [`RenderContext`](crate::renderer::RenderContext), which only calls a setter
/// or `bind_*` method when the requested state differs from what it last set.
///
/// All methods must be called on the thread that owns the native context.
pub trait RenderBackend: Sized {
    /// Native buffer object.
    type Buffer: Copy + Eq + Debug;
    /// Native texture object.
    type Texture: Copy + Eq + Debug;
    /// Native sampler object.
    type Sampler: Copy + Eq + Debug;
    /// Native linked program.
    type Program: Copy + Eq + Debug;
    /// Native vertex input layout object.
    type VertexFormat: Copy + Eq + Debug;

    /// Loads the native entry points through the window's graphics context.
    /// ## Errors
    /// * `NativeError::Loader` - If the entry points cannot be resolved.
    /// * `NativeError::FeatureUnsupported` - If the context is too old.
    fn load(window: &dyn RenderWindow) -> Result<Self, NativeError>;

    /// A short backend name for logs.
    fn name(&self) -> &'static str;

    /// Whether vertex and index buffer bindings are stored inside the vertex
    /// format object, so that switching formats also switches those bindings.
    fn vertex_input_owned_by_format(&self) -> bool;

    /// Routes native debug messages to the log.
    ///
    /// Returns `false` if the native API has no debug output.
    fn enable_debug_output(&mut self) -> bool;

    // --- Vertex formats ---

    /// Creates a vertex input layout.
    /// ## Arguments
    /// * `elements` - The attributes, never empty.
    /// * `current` - The format the caller believes is bound. Backends that
    ///   must bind the new object to fill it rebind `current` before returning.
    fn create_vertex_format(
        &mut self,
        elements: &[VertexElement],
        current: Option<Self::VertexFormat>,
    ) -> Result<Self::VertexFormat, NativeError>;

    /// Releases a vertex input layout.
    fn destroy_vertex_format(&mut self, format: Self::VertexFormat);

    /// Binds a vertex input layout, or unbinds with `None`.
    fn bind_vertex_format(&mut self, format: Option<Self::VertexFormat>);

    // --- Buffers ---

    /// Creates a buffer of `size` bytes, filled from `data` or zeroed.
    /// ## Arguments
    /// * `kind` - The buffer role.
    /// * `data` - Initial contents, exactly `size` bytes when given.
    /// * `size` - Capacity in bytes, never zero.
    /// * `usage` - Update frequency hint.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> Result<Self::Buffer, NativeError>;

    /// Releases a buffer.
    fn destroy_buffer(&mut self, kind: BufferKind, buffer: Self::Buffer);

    /// Re-specifies the whole storage of a buffer, possibly changing its size.
    fn buffer_data(
        &mut self,
        kind: BufferKind,
        buffer: Self::Buffer,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> Result<(), NativeError>;

    /// Overwrites `data.len()` bytes at `offset`. The range is already checked.
    fn buffer_sub_data(&mut self, kind: BufferKind, buffer: Self::Buffer, offset: usize, data: &[u8]);

    /// Maps `size` bytes of a buffer, runs `f` on the mapping, then unmaps.
    fn map_buffer(
        &mut self,
        kind: BufferKind,
        buffer: Self::Buffer,
        size: usize,
        access: BufferAccess,
        f: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), NativeError>;

    /// Binds a vertex buffer to a slot of the current vertex format.
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: Option<Self::Buffer>, offset: u32, stride: u32);

    /// Binds the index buffer of the current vertex format.
    fn bind_index_buffer(&mut self, buffer: Option<Self::Buffer>);

    /// Binds a constant buffer to a slot.
    fn bind_constant_buffer(&mut self, slot: u32, buffer: Option<Self::Buffer>);

    // --- Textures and samplers ---

    /// Creates a texture and generates its mipmaps.
    ///
    /// Creation must not change the texture bound to any unit below
    /// [`MAX_TEXTURES`].
    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Self::Texture, NativeError>;

    /// Uploads one layer of a texture array and regenerates its mipmaps.
    fn set_texture_layer(&mut self, texture: Self::Texture, desc: &TextureDesc, layer: u32, data: &[u8]);

    /// Releases a texture.
    fn destroy_texture(&mut self, texture: Self::Texture);

    /// Binds a texture to a unit.
    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: Option<Self::Texture>);

    /// Creates a sampler state object from an already resolved description.
    fn create_sampler(&mut self, desc: &SamplerDesc, filter: &NativeFilter) -> Result<Self::Sampler, NativeError>;

    /// Releases a sampler state object.
    fn destroy_sampler(&mut self, sampler: Self::Sampler);

    /// Binds a sampler to a unit.
    fn bind_sampler(&mut self, unit: u32, sampler: Option<Self::Sampler>);

    // --- Programs ---

    /// Compiles both stages, links them and validates the result.
    /// ## Arguments
    /// * `name` - Program name, used in diagnostics.
    /// * `vertex` / `pixel` - Fully preprocessed stage sources.
    /// ## Errors
    /// * `NativeError::ShaderCompile` - With the compiler log of the failing stage.
    /// * `NativeError::ProgramLink` - With the linker log.
    /// * `NativeError::ProgramValidate` - With the validation log.
    fn create_program(&mut self, name: &str, vertex: &str, pixel: &str) -> Result<Self::Program, NativeError>;

    /// Releases a program.
    fn destroy_program(&mut self, program: Self::Program);

    /// Makes a program current.
    fn bind_program(&mut self, program: Option<Self::Program>);

    /// Looks a constant up by name, `None` if the program has no such active constant.
    fn constant_location(&mut self, program: Self::Program, name: &str) -> Option<u32>;

    /// Writes a constant of the current program.
    fn set_constant(&mut self, location: u32, value: ConstantValue<'_>);

    // --- Fixed-function state ---

    /// Enables or disables the depth test.
    fn set_depth_test(&mut self, enabled: bool);
    /// Sets the depth comparison.
    fn set_depth_func(&mut self, func: CompareFunc);
    /// Enables or disables depth writes.
    fn set_depth_mask(&mut self, write: bool);

    /// Enables or disables the stencil test.
    fn set_stencil_test(&mut self, enabled: bool);
    /// Sets the per-face stencil comparison, reference and read mask.
    fn set_stencil_func(&mut self, front: CompareFunc, back: CompareFunc, reference: i32, read_mask: u32);
    /// Sets the stencil operations of one face.
    fn set_stencil_op(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);
    /// Sets the stencil write mask.
    fn set_stencil_write_mask(&mut self, mask: u32);

    /// Enables or disables blending.
    fn set_blend_enabled(&mut self, enabled: bool);
    /// Sets the color and alpha blend factors.
    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor, src_alpha: BlendFactor, dst_alpha: BlendFactor);
    /// Sets the color and alpha blend operations.
    fn set_blend_op(&mut self, op: BlendOp, op_alpha: BlendOp);
    /// Sets the blend constant color.
    fn set_blend_constant(&mut self, color: LinearRgba);
    /// Sets the color write mask.
    fn set_color_mask(&mut self, mask: ColorMask);

    /// Sets face culling. `CullFace::None` disables it.
    fn set_cull_face(&mut self, cull: CullFace);
    /// Sets polygon fill.
    fn set_fill_mode(&mut self, fill: FillMode);
    /// Sets the front-face winding.
    fn set_front_face(&mut self, front: FrontFace);
    /// Sets the polygon depth offset.
    fn set_polygon_offset(&mut self, offset: PolygonOffset);

    /// Sets the viewport.
    fn set_viewport(&mut self, viewport: Viewport);

    // --- Clears and draws ---

    /// Clears the color target.
    fn clear_color(&mut self, color: LinearRgba);
    /// Clears the depth buffer.
    fn clear_depth(&mut self, depth: f32);
    /// Clears the stencil buffer.
    fn clear_stencil(&mut self, value: i32);
    /// Clears depth and stencil together.
    fn clear_depth_stencil(&mut self, depth: f32, stencil: i32);

    /// Draws non-indexed geometry.
    fn draw(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32);
    /// Draws instanced non-indexed geometry.
    fn draw_instanced(&mut self, primitive: PrimitiveType, first_vertex: u32, vertex_count: u32, instance_count: u32);
    /// Draws indexed geometry from the bound index buffer.
    fn draw_indexed(&mut self, primitive: PrimitiveType, index_type: IndexType, first_index: u32, index_count: u32);
    /// Draws instanced indexed geometry from the bound index buffer.
    fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        index_type: IndexType,
        first_index: u32,
        index_count: u32,
        instance_count: u32,
    );
}
