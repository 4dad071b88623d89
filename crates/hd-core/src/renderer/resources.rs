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

//! Resource creation, update, binding and destruction on [`RenderContext`].
//!
//! Creation follows one pattern for every kind: validate the arguments,
//! allocate the native object, record it in the registry and hand out a
//! handle. Destruction removes the record, releases the native object and
//! clears every cache slot still holding it, so a later bind of a new object
//! that reuses the same native id is never skipped.

use super::api::*;
use super::context::{logged, take_record, RenderContext};
use super::error::{ContractViolation, NativeError, RenderResult};
use super::registry::*;
use super::traits::RenderBackend;
use crate::handle::{Handle, HandleTag, ProgramConstant};

type BufferArena<B, T> = Arena<T, BufferRecord<<B as RenderBackend>::Buffer>>;
type SelectBuffers<B, T> = fn(&mut ResourceRegistry<B>) -> &mut BufferArena<B, T>;
type TextureArena<B, T> = Arena<T, TextureRecord<<B as RenderBackend>::Texture>>;
type SelectTextures<B, T> = fn(&mut ResourceRegistry<B>) -> &mut TextureArena<B, T>;

fn check_slot(kind: &'static str, slot: u32, max: u32) -> Result<(), ContractViolation> {
    if slot >= max {
        return Err(ContractViolation::SlotOutOfRange { kind, slot, max });
    }
    Ok(())
}

fn check_data(data: Option<&[u8]>, expected: usize) -> Result<(), ContractViolation> {
    match data {
        Some(bytes) if bytes.len() != expected => Err(ContractViolation::DataSizeMismatch {
            expected,
            actual: bytes.len(),
        }),
        _ => Ok(()),
    }
}

fn check_range(offset: usize, size: usize, capacity: usize) -> Result<(), ContractViolation> {
    match offset.checked_add(size) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(ContractViolation::OutOfBounds {
            offset,
            size,
            capacity,
        }),
    }
}

fn check_elements(elements: &[VertexElement]) -> Result<(), ContractViolation> {
    if elements.is_empty() {
        return Err(ContractViolation::EmptyVertexFormat);
    }
    for element in elements {
        if element.index >= MAX_VERTEX_ATTRIBUTES {
            return Err(ContractViolation::VertexElementOutOfRange {
                field: "index",
                value: element.index,
                max: MAX_VERTEX_ATTRIBUTES - 1,
            });
        }
        if element.slot >= MAX_VERTEX_BUFFERS {
            return Err(ContractViolation::VertexElementOutOfRange {
                field: "slot",
                value: element.slot,
                max: MAX_VERTEX_BUFFERS - 1,
            });
        }
    }
    Ok(())
}

// --- Vertex formats ---
impl<B: RenderBackend> RenderContext<B> {
    /// Creates a vertex format from its attributes.
    ///
    /// The vertex format bound before the call stays bound.
    pub fn create_vertex_format(&mut self, elements: &[VertexElement]) -> RenderResult<VertexFormatHandle> {
        let result = self.try_create_vertex_format(elements);
        logged("create_vertex_format", result)
    }

    fn try_create_vertex_format(&mut self, elements: &[VertexElement]) -> RenderResult<VertexFormatHandle> {
        check_elements(elements)?;
        let (backend, registry, cache) = self.parts()?;
        let native = backend.create_vertex_format(elements, cache.vertex_format())?;
        let handle = registry.vertex_formats.insert(VertexFormatRecord {
            native,
            elements: elements.to_vec(),
        });
        log::debug!("Created {handle:?} with {} elements", elements.len());
        Ok(handle)
    }

    /// Destroys a vertex format and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_vertex_format(&mut self, handle: &mut VertexFormatHandle) -> RenderResult<()> {
        let id = *handle;
        let created = self.is_created();
        let result = take_record(created, &mut self.registry.vertex_formats, handle).map(|record| {
            if let (Some(record), Some(backend)) = (record, self.backend.as_mut()) {
                self.cache
                    .forget_vertex_format(record.native, backend.vertex_input_owned_by_format());
                backend.destroy_vertex_format(record.native);
                log::debug!("Destroyed {id:?}");
            }
        });
        logged("destroy_vertex_format", result.map_err(Into::into))
    }

    /// Binds a vertex format.
    pub fn bind_vertex_format(&mut self, handle: VertexFormatHandle) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            let native = registry.vertex_formats.get(handle)?.native;
            cache.bind_vertex_format(backend, native);
            Ok(())
        });
        logged("bind_vertex_format", result.map_err(Into::into))
    }
}

// --- Buffers, shared by the three kinds ---
impl<B: RenderBackend> RenderContext<B> {
    fn buffer_create<T: HandleTag>(
        &mut self,
        kind: BufferKind,
        select: SelectBuffers<B, T>,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> RenderResult<Handle<T>> {
        if size == 0 {
            return Err(ContractViolation::ZeroSize { kind: kind.name() }.into());
        }
        check_data(data, size)?;
        let (backend, registry, _) = self.parts()?;
        let native = backend.create_buffer(kind, data, size, usage)?;
        let handle = select(registry).insert(BufferRecord { native, size, usage });
        log::debug!("Created {handle:?} ({size} bytes, {usage:?})");
        Ok(handle)
    }

    fn buffer_destroy<T: HandleTag>(
        &mut self,
        kind: BufferKind,
        select: SelectBuffers<B, T>,
        handle: &mut Handle<T>,
    ) -> RenderResult<()> {
        let id = *handle;
        let created = self.is_created();
        let Some(record) = take_record(created, select(&mut self.registry), handle)? else {
            return Ok(());
        };
        self.cache.forget_buffer(record.native);
        if let Some(backend) = self.backend.as_mut() {
            backend.destroy_buffer(kind, record.native);
        }
        log::debug!("Destroyed {id:?}");
        Ok(())
    }

    fn buffer_set_data<T: HandleTag>(
        &mut self,
        kind: BufferKind,
        select: SelectBuffers<B, T>,
        handle: Handle<T>,
        data: Option<&[u8]>,
        size: usize,
    ) -> RenderResult<()> {
        if size == 0 {
            return Err(ContractViolation::ZeroSize { kind: kind.name() }.into());
        }
        check_data(data, size)?;
        let (backend, registry, _) = self.parts()?;
        let record = select(registry).get_mut(handle)?;
        backend.buffer_data(kind, record.native, data, size, record.usage)?;
        record.size = size;
        Ok(())
    }

    fn buffer_update<T: HandleTag>(
        &mut self,
        kind: BufferKind,
        select: SelectBuffers<B, T>,
        handle: Handle<T>,
        offset: usize,
        data: &[u8],
        whole: bool,
    ) -> RenderResult<()> {
        let (backend, registry, _) = self.parts()?;
        let record = select(registry).get(handle)?;
        if whole && data.len() != record.size {
            return Err(ContractViolation::DataSizeMismatch {
                expected: record.size,
                actual: data.len(),
            }
            .into());
        }
        check_range(offset, data.len(), record.size)?;
        backend.buffer_sub_data(kind, record.native, offset, data);
        Ok(())
    }

    fn buffer_map<T: HandleTag, R>(
        &mut self,
        kind: BufferKind,
        select: SelectBuffers<B, T>,
        handle: Handle<T>,
        access: BufferAccess,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> RenderResult<R> {
        let (backend, registry, _) = self.parts()?;
        let record = *select(registry).get(handle)?;

        let mut f = Some(f);
        let mut output = None;
        backend.map_buffer(kind, record.native, record.size, access, &mut |bytes: &mut [u8]| {
            if let Some(f) = f.take() {
                output = Some(f(bytes));
            }
        })?;
        output.ok_or_else(|| {
            NativeError::Allocation {
                kind: kind.name(),
                reason: "the mapping was never made available".to_owned(),
            }
            .into()
        })
    }
}

// --- Vertex buffers ---
impl<B: RenderBackend> RenderContext<B> {
    /// Creates a vertex buffer of `size` bytes, filled from `data` or zeroed.
    pub fn create_vertex_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> RenderResult<VertexBufferHandle> {
        let result = self.buffer_create(BufferKind::Vertex, |r| &mut r.vertex_buffers, data, size, usage);
        logged("create_vertex_buffer", result)
    }

    /// Destroys a vertex buffer and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_vertex_buffer(&mut self, handle: &mut VertexBufferHandle) -> RenderResult<()> {
        let result = self.buffer_destroy(BufferKind::Vertex, |r| &mut r.vertex_buffers, handle);
        logged("destroy_vertex_buffer", result)
    }

    /// Re-specifies the storage of a vertex buffer; the size may change.
    pub fn set_vertex_buffer_data(
        &mut self,
        handle: VertexBufferHandle,
        data: Option<&[u8]>,
        size: usize,
    ) -> RenderResult<()> {
        let result = self.buffer_set_data(BufferKind::Vertex, |r| &mut r.vertex_buffers, handle, data, size);
        logged("set_vertex_buffer_data", result)
    }

    /// Overwrites the whole vertex buffer. `data` must match its size.
    pub fn update_vertex_buffer_data(&mut self, handle: VertexBufferHandle, data: &[u8]) -> RenderResult<()> {
        let result = self.buffer_update(BufferKind::Vertex, |r| &mut r.vertex_buffers, handle, 0, data, true);
        logged("update_vertex_buffer_data", result)
    }

    /// Overwrites `data.len()` bytes at `offset`, which must fit in the buffer.
    pub fn update_vertex_buffer_data_range(
        &mut self,
        handle: VertexBufferHandle,
        data: &[u8],
        offset: usize,
    ) -> RenderResult<()> {
        let result = self.buffer_update(BufferKind::Vertex, |r| &mut r.vertex_buffers, handle, offset, data, false);
        logged("update_vertex_buffer_data_range", result)
    }

    /// Maps the vertex buffer for the duration of `f`.
    pub fn map_vertex_buffer<R>(
        &mut self,
        handle: VertexBufferHandle,
        access: BufferAccess,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> RenderResult<R> {
        let result = self.buffer_map(BufferKind::Vertex, |r| &mut r.vertex_buffers, handle, access, f);
        logged("map_vertex_buffer", result)
    }

    /// Binds a vertex buffer to `slot`, reading vertices `stride` bytes apart from `offset`.
    pub fn bind_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        slot: u32,
        offset: u32,
        stride: u32,
    ) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            check_slot("vertex buffer", slot, MAX_VERTEX_BUFFERS)?;
            if stride == 0 {
                return Err(ContractViolation::ZeroStride);
            }
            let native = registry.vertex_buffers.get(handle)?.native;
            cache.bind_vertex_buffer(backend, slot, native, offset, stride);
            Ok(())
        });
        logged("bind_vertex_buffer", result.map_err(Into::into))
    }
}

// --- Index buffers ---
impl<B: RenderBackend> RenderContext<B> {
    /// Creates an index buffer of `size` bytes, filled from `data` or zeroed.
    pub fn create_index_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> RenderResult<IndexBufferHandle> {
        let result = self.buffer_create(BufferKind::Index, |r| &mut r.index_buffers, data, size, usage);
        logged("create_index_buffer", result)
    }

    /// Destroys an index buffer and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_index_buffer(&mut self, handle: &mut IndexBufferHandle) -> RenderResult<()> {
        let result = self.buffer_destroy(BufferKind::Index, |r| &mut r.index_buffers, handle);
        logged("destroy_index_buffer", result)
    }

    /// Re-specifies the storage of an index buffer; the size may change.
    pub fn set_index_buffer_data(
        &mut self,
        handle: IndexBufferHandle,
        data: Option<&[u8]>,
        size: usize,
    ) -> RenderResult<()> {
        let result = self.buffer_set_data(BufferKind::Index, |r| &mut r.index_buffers, handle, data, size);
        logged("set_index_buffer_data", result)
    }

    /// Overwrites the whole index buffer. `data` must match its size.
    pub fn update_index_buffer_data(&mut self, handle: IndexBufferHandle, data: &[u8]) -> RenderResult<()> {
        let result = self.buffer_update(BufferKind::Index, |r| &mut r.index_buffers, handle, 0, data, true);
        logged("update_index_buffer_data", result)
    }

    /// Overwrites `data.len()` bytes at `offset`, which must fit in the buffer.
    pub fn update_index_buffer_data_range(
        &mut self,
        handle: IndexBufferHandle,
        data: &[u8],
        offset: usize,
    ) -> RenderResult<()> {
        let result = self.buffer_update(BufferKind::Index, |r| &mut r.index_buffers, handle, offset, data, false);
        logged("update_index_buffer_data_range", result)
    }

    /// Maps the index buffer for the duration of `f`.
    pub fn map_index_buffer<R>(
        &mut self,
        handle: IndexBufferHandle,
        access: BufferAccess,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> RenderResult<R> {
        let result = self.buffer_map(BufferKind::Index, |r| &mut r.index_buffers, handle, access, f);
        logged("map_index_buffer", result)
    }

    /// Binds the index buffer used by indexed draws.
    pub fn bind_index_buffer(&mut self, handle: IndexBufferHandle) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            let native = registry.index_buffers.get(handle)?.native;
            cache.bind_index_buffer(backend, native);
            Ok(())
        });
        logged("bind_index_buffer", result.map_err(Into::into))
    }
}

// --- Constant buffers ---
impl<B: RenderBackend> RenderContext<B> {
    /// Creates a constant buffer of `size` bytes, filled from `data` or zeroed.
    pub fn create_constant_buffer(
        &mut self,
        data: Option<&[u8]>,
        size: usize,
        usage: BufferUsage,
    ) -> RenderResult<ConstantBufferHandle> {
        let result = self.buffer_create(BufferKind::Constant, |r| &mut r.constant_buffers, data, size, usage);
        logged("create_constant_buffer", result)
    }

    /// Destroys a constant buffer and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_constant_buffer(&mut self, handle: &mut ConstantBufferHandle) -> RenderResult<()> {
        let result = self.buffer_destroy(BufferKind::Constant, |r| &mut r.constant_buffers, handle);
        logged("destroy_constant_buffer", result)
    }

    /// Re-specifies the storage of a constant buffer; the size may change.
    pub fn set_constant_buffer_data(
        &mut self,
        handle: ConstantBufferHandle,
        data: Option<&[u8]>,
        size: usize,
    ) -> RenderResult<()> {
        let result = self.buffer_set_data(BufferKind::Constant, |r| &mut r.constant_buffers, handle, data, size);
        logged("set_constant_buffer_data", result)
    }

    /// Overwrites the whole constant buffer. `data` must match its size.
    pub fn update_constant_buffer_data(&mut self, handle: ConstantBufferHandle, data: &[u8]) -> RenderResult<()> {
        let result = self.buffer_update(BufferKind::Constant, |r| &mut r.constant_buffers, handle, 0, data, true);
        logged("update_constant_buffer_data", result)
    }

    /// Overwrites `data.len()` bytes at `offset`, which must fit in the buffer.
    pub fn update_constant_buffer_data_range(
        &mut self,
        handle: ConstantBufferHandle,
        data: &[u8],
        offset: usize,
    ) -> RenderResult<()> {
        let result =
            self.buffer_update(BufferKind::Constant, |r| &mut r.constant_buffers, handle, offset, data, false);
        logged("update_constant_buffer_data_range", result)
    }

    /// Maps the constant buffer for the duration of `f`.
    pub fn map_constant_buffer<R>(
        &mut self,
        handle: ConstantBufferHandle,
        access: BufferAccess,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> RenderResult<R> {
        let result = self.buffer_map(BufferKind::Constant, |r| &mut r.constant_buffers, handle, access, f);
        logged("map_constant_buffer", result)
    }

    /// Binds a constant buffer to `slot`.
    pub fn bind_constant_buffer(&mut self, handle: ConstantBufferHandle, slot: u32) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            check_slot("constant buffer", slot, MAX_CONSTANT_BUFFERS)?;
            let native = registry.constant_buffers.get(handle)?.native;
            cache.bind_constant_buffer(backend, slot, native);
            Ok(())
        });
        logged("bind_constant_buffer", result.map_err(Into::into))
    }
}

// --- Textures ---
impl<B: RenderBackend> RenderContext<B> {
    fn texture_create<T: HandleTag>(
        &mut self,
        select: SelectTextures<B, T>,
        desc: TextureDesc,
        data: Option<&[u8]>,
    ) -> RenderResult<Handle<T>> {
        if desc.width == 0 || desc.height == 0 || desc.layers == 0 {
            return Err(ContractViolation::ZeroDimensions {
                width: desc.width,
                height: desc.height,
                layers: desc.layers,
            }
            .into());
        }
        let size = desc.total_size().ok_or(ContractViolation::TextureTooLarge {
            width: desc.width,
            height: desc.height,
            layers: desc.layers,
        })?;
        check_data(data, size)?;
        let (backend, registry, _) = self.parts()?;
        let native = backend.create_texture(&desc, data)?;
        let handle = select(registry).insert(TextureRecord { native, desc });
        log::debug!(
            "Created {handle:?} ({}x{}x{} {:?})",
            desc.width,
            desc.height,
            desc.layers,
            desc.format
        );
        Ok(handle)
    }

    fn texture_destroy<T: HandleTag>(&mut self, select: SelectTextures<B, T>, handle: &mut Handle<T>) -> RenderResult<()> {
        let id = *handle;
        let created = self.is_created();
        let Some(record) = take_record(created, select(&mut self.registry), handle)? else {
            return Ok(());
        };
        self.cache.forget_texture(record.native);
        if let Some(backend) = self.backend.as_mut() {
            backend.destroy_texture(record.native);
        }
        log::debug!("Destroyed {id:?}");
        Ok(())
    }

    fn texture_bind<T: HandleTag>(&mut self, select: SelectTextures<B, T>, handle: Handle<T>, unit: u32) -> RenderResult<()> {
        check_slot("texture", unit, MAX_TEXTURES)?;
        let (backend, registry, cache) = self.parts()?;
        let record = select(registry).get(handle)?;
        cache.bind_texture(backend, unit, record.desc.kind, record.native);
        Ok(())
    }

    /// Creates a 2D texture, filled from `data` or zeroed. Mipmaps are generated.
    pub fn create_texture_2d(
        &mut self,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> RenderResult<Texture2DHandle> {
        let desc = TextureDesc {
            kind: TextureKind::Texture2D,
            width,
            height,
            layers: 1,
            format,
        };
        let result = self.texture_create(|r| &mut r.textures_2d, desc, data);
        logged("create_texture_2d", result)
    }

    /// Destroys a 2D texture and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_texture_2d(&mut self, handle: &mut Texture2DHandle) -> RenderResult<()> {
        let result = self.texture_destroy(|r| &mut r.textures_2d, handle);
        logged("destroy_texture_2d", result)
    }

    /// Binds a 2D texture to `unit`.
    pub fn bind_texture_2d(&mut self, handle: Texture2DHandle, unit: u32) -> RenderResult<()> {
        let result = self.texture_bind(|r| &mut r.textures_2d, handle, unit);
        logged("bind_texture_2d", result)
    }

    /// Creates a texture array of `layers` layers, filled from `data` or zeroed.
    pub fn create_texture_2d_array(
        &mut self,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: TextureFormat,
        layers: u32,
    ) -> RenderResult<Texture2DArrayHandle> {
        let desc = TextureDesc {
            kind: TextureKind::Texture2DArray,
            width,
            height,
            layers,
            format,
        };
        let result = self.texture_create(|r| &mut r.texture_2d_arrays, desc, data);
        logged("create_texture_2d_array", result)
    }

    /// Replaces one layer of a texture array. `data` must hold exactly one layer.
    pub fn set_texture_2d_array_layer_data(
        &mut self,
        handle: Texture2DArrayHandle,
        layer: u32,
        data: &[u8],
    ) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, _)| {
            let record = registry.texture_2d_arrays.get(handle)?;
            if layer >= record.desc.layers {
                return Err(ContractViolation::LayerOutOfRange {
                    layer,
                    layers: record.desc.layers,
                });
            }
            // Fits, since the whole array was sized on creation.
            check_data(Some(data), record.desc.layer_size().unwrap_or_default())?;
            backend.set_texture_layer(record.native, &record.desc, layer, data);
            Ok(())
        });
        logged("set_texture_2d_array_layer_data", result.map_err(Into::into))
    }

    /// Destroys a texture array and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_texture_2d_array(&mut self, handle: &mut Texture2DArrayHandle) -> RenderResult<()> {
        let result = self.texture_destroy(|r| &mut r.texture_2d_arrays, handle);
        logged("destroy_texture_2d_array", result)
    }

    /// Binds a texture array to `unit`.
    pub fn bind_texture_2d_array(&mut self, handle: Texture2DArrayHandle, unit: u32) -> RenderResult<()> {
        let result = self.texture_bind(|r| &mut r.texture_2d_arrays, handle, unit);
        logged("bind_texture_2d_array", result)
    }
}

// --- Sampler states ---
impl<B: RenderBackend> RenderContext<B> {
    /// Creates a sampler state object.
    pub fn create_sampler_state(&mut self, desc: &SamplerDesc) -> RenderResult<SamplerStateHandle> {
        let result = self.try_create_sampler_state(desc);
        logged("create_sampler_state", result)
    }

    fn try_create_sampler_state(&mut self, desc: &SamplerDesc) -> RenderResult<SamplerStateHandle> {
        let filter = desc.resolve()?;
        let (backend, registry, _) = self.parts()?;
        let native = backend.create_sampler(desc, &filter)?;
        let handle = registry.sampler_states.insert(SamplerRecord { native, desc: *desc });
        log::debug!("Created {handle:?} ({filter:?})");
        Ok(handle)
    }

    /// Destroys a sampler state and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_sampler_state(&mut self, handle: &mut SamplerStateHandle) -> RenderResult<()> {
        let id = *handle;
        let created = self.is_created();
        let result = take_record(created, &mut self.registry.sampler_states, handle).map(|record| {
            if let (Some(record), Some(backend)) = (record, self.backend.as_mut()) {
                self.cache.forget_sampler(record.native);
                backend.destroy_sampler(record.native);
                log::debug!("Destroyed {id:?}");
            }
        });
        logged("destroy_sampler_state", result.map_err(Into::into))
    }

    /// Binds a sampler state to `unit`.
    pub fn bind_sampler_state(&mut self, handle: SamplerStateHandle, unit: u32) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            check_slot("sampler", unit, MAX_SAMPLER_STATES)?;
            let native = registry.sampler_states.get(handle)?.native;
            cache.bind_sampler(backend, unit, native);
            Ok(())
        });
        logged("bind_sampler_state", result.map_err(Into::into))
    }
}

// --- Programs ---
impl<B: RenderBackend> RenderContext<B> {
    /// Compiles and links a program.
    ///
    /// Both stages are prefixed with the version directive of the context,
    /// one `#define` per entry of the semicolon-separated `defines` and a
    /// `#line 1` reset.
    ///
    /// ## Errors
    /// * `ContractViolation::EmptyShaderSource` - If a stage has no code.
    /// * `NativeError::ShaderCompile`, `NativeError::ProgramLink` or
    ///   `NativeError::ProgramValidate` - With the native log.
    pub fn create_program(&mut self, name: &str, vertex: &str, pixel: &str, defines: &str) -> RenderResult<ProgramHandle> {
        let result = self.try_create_program(name, vertex, pixel, defines);
        logged("create_program", result)
    }

    fn try_create_program(&mut self, name: &str, vertex: &str, pixel: &str, defines: &str) -> RenderResult<ProgramHandle> {
        if vertex.trim().is_empty() {
            return Err(ContractViolation::EmptyShaderSource {
                stage: ShaderStage::Vertex.name(),
            }
            .into());
        }
        if pixel.trim().is_empty() {
            return Err(ContractViolation::EmptyShaderSource {
                stage: ShaderStage::Pixel.name(),
            }
            .into());
        }
        let preamble = ShaderPreamble::new(&self.settings, defines);
        let (backend, registry, _) = self.parts()?;
        let native = backend.create_program(name, &preamble.apply(vertex), &preamble.apply(pixel))?;
        let handle = registry.programs.insert(ProgramRecord {
            native,
            name: name.to_owned(),
        });
        log::debug!("Created {handle:?} '{name}'");
        Ok(handle)
    }

    /// Destroys a program and invalidates `handle`. Invalid handles are ignored.
    pub fn destroy_program(&mut self, handle: &mut ProgramHandle) -> RenderResult<()> {
        let id = *handle;
        let created = self.is_created();
        let result = take_record(created, &mut self.registry.programs, handle).map(|record| {
            if let (Some(record), Some(backend)) = (record, self.backend.as_mut()) {
                self.cache.forget_program(record.native);
                backend.destroy_program(record.native);
                log::debug!("Destroyed {id:?} '{}'", record.name);
            }
        });
        logged("destroy_program", result.map_err(Into::into))
    }

    /// Makes a program current.
    pub fn bind_program(&mut self, handle: ProgramHandle) -> RenderResult<()> {
        let result = self.parts().and_then(|(backend, registry, cache)| {
            let native = registry.programs.get(handle)?.native;
            cache.bind_program(backend, native);
            Ok(())
        });
        logged("bind_program", result.map_err(Into::into))
    }

    /// Resolves a named constant of a program.
    ///
    /// A name the program does not use is not an error: the result is
    /// [`ProgramConstant::INVALID`].
    pub fn program_constant(&mut self, handle: ProgramHandle, name: &str) -> RenderResult<ProgramConstant> {
        let result = self.parts().and_then(|(backend, registry, _)| {
            if name.is_empty() {
                return Err(ContractViolation::EmptyConstantName);
            }
            let record = registry.programs.get(handle)?;
            let constant = backend
                .constant_location(record.native, name)
                .and_then(|location| i32::try_from(location).ok())
                .map_or(ProgramConstant::INVALID, ProgramConstant::new);
            if !constant.is_valid() {
                log::debug!("Program '{}' has no active constant '{name}'", record.name);
            }
            Ok(constant)
        });
        logged("program_constant", result.map_err(Into::into))
    }

    /// Writes a constant of the current program.
    pub fn set_program_constant<'a>(
        &mut self,
        constant: ProgramConstant,
        value: impl Into<ConstantValue<'a>>,
    ) -> RenderResult<()> {
        let value = value.into();
        let result = self.parts().and_then(|(backend, _, cache)| {
            let location = constant.location().ok_or(ContractViolation::InvalidConstant)?;
            if cache.program().is_none() {
                return Err(ContractViolation::NoProgramBound);
            }
            backend.set_constant(location, value);
            Ok(())
        });
        logged("set_program_constant", result.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_is_inclusive_of_the_end() {
        assert!(check_range(0, 64, 64).is_ok());
        assert!(check_range(60, 4, 64).is_ok());
        assert_eq!(
            check_range(60, 8, 64),
            Err(ContractViolation::OutOfBounds {
                offset: 60,
                size: 8,
                capacity: 64
            })
        );
        assert!(check_range(usize::MAX, 2, 64).is_err());
    }

    #[test]
    fn element_checks() {
        assert_eq!(check_elements(&[]), Err(ContractViolation::EmptyVertexFormat));
        let bad_slot = VertexElement::new(VertexElementType::Float2, 0, MAX_VERTEX_BUFFERS, 0);
        assert!(matches!(
            check_elements(&[bad_slot]),
            Err(ContractViolation::VertexElementOutOfRange { field: "slot", .. })
        ));
    }
}
