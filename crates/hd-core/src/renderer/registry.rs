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

//! Ownership of every live resource record, addressed by generation-checked handles.

use crate::handle::{Handle, HandleTag};
use crate::renderer::api::{BufferUsage, SamplerDesc, TextureDesc, VertexElement};
use crate::renderer::error::ContractViolation;
use crate::renderer::traits::RenderBackend;
use std::marker::PhantomData;

macro_rules! handle_tags {
    ($($(#[$meta:meta])* $tag:ident => $alias:ident, $kind:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub enum $tag {}

            impl HandleTag for $tag {
                const KIND: &'static str = $kind;
            }

            #[doc = concat!("Handle to a ", $kind, ".")]
            pub type $alias = Handle<$tag>;
        )*
    };
}

handle_tags! {
    /// Tag of vertex format handles.
    VertexFormatTag => VertexFormatHandle, "vertex format";
    /// Tag of vertex buffer handles.
    VertexBufferTag => VertexBufferHandle, "vertex buffer";
    /// Tag of index buffer handles.
    IndexBufferTag => IndexBufferHandle, "index buffer";
    /// Tag of constant buffer handles.
    ConstantBufferTag => ConstantBufferHandle, "constant buffer";
    /// Tag of 2D texture handles.
    Texture2DTag => Texture2DHandle, "texture 2D";
    /// Tag of 2D texture array handles.
    Texture2DArrayTag => Texture2DArrayHandle, "texture 2D array";
    /// Tag of sampler state handles.
    SamplerStateTag => SamplerStateHandle, "sampler state";
    /// Tag of program handles.
    ProgramTag => ProgramHandle, "program";
}

struct Slot<R> {
    generation: u32,
    value: Option<R>,
}

/// A slot arena handing out [`Handle`]s.
///
/// Removing a record bumps its slot generation, so every copy of the old
/// handle is rejected from then on. Freed slots are reused.
pub struct Arena<T: HandleTag, R> {
    slots: Vec<Slot<R>>,
    free: Vec<u32>,
    len: usize,
    _tag: PhantomData<fn() -> T>,
}

impl<T: HandleTag, R> Default for Arena<T, R> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _tag: PhantomData,
        }
    }
}

impl<T: HandleTag, R> Arena<T, R> {
    /// Stores a record and returns its handle.
    pub fn insert(&mut self, value: R) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::from_raw_parts(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        Handle::from_raw_parts(index, 1)
    }

    fn slot(&self, handle: Handle<T>) -> Result<&Slot<R>, ContractViolation> {
        if !handle.is_valid() {
            return Err(ContractViolation::InvalidHandle { kind: T::KIND });
        }
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation() && slot.value.is_some())
            .ok_or(ContractViolation::StaleHandle { kind: T::KIND })
    }

    /// Returns the record of a live handle.
    pub fn get(&self, handle: Handle<T>) -> Result<&R, ContractViolation> {
        self.slot(handle)?
            .value
            .as_ref()
            .ok_or(ContractViolation::StaleHandle { kind: T::KIND })
    }

    /// Returns the record of a live handle, mutably.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Result<&mut R, ContractViolation> {
        self.slot(handle)?;
        self.slots[handle.index() as usize]
            .value
            .as_mut()
            .ok_or(ContractViolation::StaleHandle { kind: T::KIND })
    }

    /// Returns `true` if `handle` refers to a live record.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.slot(handle).is_ok()
    }

    /// Removes a record, invalidating every copy of its handle.
    pub fn remove(&mut self, handle: Handle<T>) -> Result<R, ContractViolation> {
        self.slot(handle)?;
        let slot = &mut self.slots[handle.index() as usize];
        let value = slot
            .value
            .take()
            .ok_or(ContractViolation::StaleHandle { kind: T::KIND })?;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(handle.index());
        self.len -= 1;
        Ok(value)
    }

    /// Removes every live record, in slot order.
    ///
    /// Slots keep their bumped generations, so handles issued before the
    /// drain stay stale after new records are inserted.
    pub fn drain(&mut self) -> Vec<R> {
        let mut drained = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1).max(1);
                self.free.push(index as u32);
                drained.push(value);
            }
        }
        self.len = 0;
        drained
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handles of every live record, in slot order.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Iterates over the live records with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &R)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::from_raw_parts(index as u32, slot.generation), value))
        })
    }
}

/// A vertex format and its attributes.
#[derive(Debug, Clone)]
pub struct VertexFormatRecord<N> {
    /// Native object.
    pub native: N,
    /// The attributes it was created from.
    pub elements: Vec<VertexElement>,
}

/// A buffer of any kind.
#[derive(Debug, Clone, Copy)]
pub struct BufferRecord<N> {
    /// Native object.
    pub native: N,
    /// Capacity in bytes.
    pub size: usize,
    /// Declared update frequency.
    pub usage: BufferUsage,
}

/// A 2D texture or texture array.
#[derive(Debug, Clone, Copy)]
pub struct TextureRecord<N> {
    /// Native object.
    pub native: N,
    /// Shape and format.
    pub desc: TextureDesc,
}

/// A sampler state object.
#[derive(Debug, Clone, Copy)]
pub struct SamplerRecord<N> {
    /// Native object.
    pub native: N,
    /// Description it was created from.
    pub desc: SamplerDesc,
}

/// A linked program.
#[derive(Debug, Clone)]
pub struct ProgramRecord<N> {
    /// Native object.
    pub native: N,
    /// Name used in diagnostics.
    pub name: String,
}

/// Live resource counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    /// Vertex formats.
    pub vertex_formats: usize,
    /// Vertex buffers.
    pub vertex_buffers: usize,
    /// Index buffers.
    pub index_buffers: usize,
    /// Constant buffers.
    pub constant_buffers: usize,
    /// 2D textures.
    pub textures_2d: usize,
    /// 2D texture arrays.
    pub texture_2d_arrays: usize,
    /// Sampler states.
    pub sampler_states: usize,
    /// Programs.
    pub programs: usize,
}

impl RegistryCounts {
    /// Sum of every kind.
    pub fn total(&self) -> usize {
        self.vertex_formats
            + self.vertex_buffers
            + self.index_buffers
            + self.constant_buffers
            + self.textures_2d
            + self.texture_2d_arrays
            + self.sampler_states
            + self.programs
    }
}

/// One arena per resource kind.
pub struct ResourceRegistry<B: RenderBackend> {
    pub(crate) vertex_formats: Arena<VertexFormatTag, VertexFormatRecord<B::VertexFormat>>,
    pub(crate) vertex_buffers: Arena<VertexBufferTag, BufferRecord<B::Buffer>>,
    pub(crate) index_buffers: Arena<IndexBufferTag, BufferRecord<B::Buffer>>,
    pub(crate) constant_buffers: Arena<ConstantBufferTag, BufferRecord<B::Buffer>>,
    pub(crate) textures_2d: Arena<Texture2DTag, TextureRecord<B::Texture>>,
    pub(crate) texture_2d_arrays: Arena<Texture2DArrayTag, TextureRecord<B::Texture>>,
    pub(crate) sampler_states: Arena<SamplerStateTag, SamplerRecord<B::Sampler>>,
    pub(crate) programs: Arena<ProgramTag, ProgramRecord<B::Program>>,
}

impl<B: RenderBackend> Default for ResourceRegistry<B> {
    fn default() -> Self {
        Self {
            vertex_formats: Arena::default(),
            vertex_buffers: Arena::default(),
            index_buffers: Arena::default(),
            constant_buffers: Arena::default(),
            textures_2d: Arena::default(),
            texture_2d_arrays: Arena::default(),
            sampler_states: Arena::default(),
            programs: Arena::default(),
        }
    }
}

impl<B: RenderBackend> ResourceRegistry<B> {
    /// Live resource counts per kind.
    pub fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            vertex_formats: self.vertex_formats.len(),
            vertex_buffers: self.vertex_buffers.len(),
            index_buffers: self.index_buffers.len(),
            constant_buffers: self.constant_buffers.len(),
            textures_2d: self.textures_2d.len(),
            texture_2d_arrays: self.texture_2d_arrays.len(),
            sampler_states: self.sampler_states.len(),
            programs: self.programs.len(),
        }
    }

    /// Record of a vertex buffer.
    pub fn vertex_buffer(&self, handle: VertexBufferHandle) -> Result<&BufferRecord<B::Buffer>, ContractViolation> {
        self.vertex_buffers.get(handle)
    }

    /// Record of an index buffer.
    pub fn index_buffer(&self, handle: IndexBufferHandle) -> Result<&BufferRecord<B::Buffer>, ContractViolation> {
        self.index_buffers.get(handle)
    }

    /// Record of a constant buffer.
    pub fn constant_buffer(&self, handle: ConstantBufferHandle) -> Result<&BufferRecord<B::Buffer>, ContractViolation> {
        self.constant_buffers.get(handle)
    }

    /// Record of a 2D texture.
    pub fn texture_2d(&self, handle: Texture2DHandle) -> Result<&TextureRecord<B::Texture>, ContractViolation> {
        self.textures_2d.get(handle)
    }

    /// Record of a 2D texture array.
    pub fn texture_2d_array(
        &self,
        handle: Texture2DArrayHandle,
    ) -> Result<&TextureRecord<B::Texture>, ContractViolation> {
        self.texture_2d_arrays.get(handle)
    }

    /// Record of a program.
    pub fn program(&self, handle: ProgramHandle) -> Result<&ProgramRecord<B::Program>, ContractViolation> {
        self.programs.get(handle)
    }
}
