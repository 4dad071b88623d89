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

//! Portable data types of the render layer: enums, state descriptors, vertex
//! layouts, sampler descriptions and shader preprocessing.

pub mod enums;
pub mod sampler;
pub mod shader;
pub mod state;
pub mod vertex;

pub use self::enums::*;
pub use self::sampler::*;
pub use self::shader::{ConstantValue, ShaderPreamble};
pub use self::state::*;
pub use self::vertex::*;

/// Number of vertex buffer binding slots.
pub const MAX_VERTEX_BUFFERS: u32 = 8;
/// Number of constant (uniform) buffer binding slots.
pub const MAX_CONSTANT_BUFFERS: u32 = 8;
/// Number of texture units.
pub const MAX_TEXTURES: u32 = 8;
/// Number of sampler units.
pub const MAX_SAMPLER_STATES: u32 = 8;
/// Number of vertex attribute locations accepted in a vertex format.
pub const MAX_VERTEX_ATTRIBUTES: u32 = 16;

/// The role a buffer plays, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex attribute data.
    Vertex,
    /// Index data.
    Index,
    /// Shader constant (uniform block) data.
    Constant,
}

impl BufferKind {
    /// Name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            BufferKind::Vertex => "vertex buffer",
            BufferKind::Index => "index buffer",
            BufferKind::Constant => "constant buffer",
        }
    }
}

/// Texture targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A single 2D image.
    Texture2D,
    /// An array of 2D layers of the same size.
    Texture2DArray,
}

/// Shape and format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Target.
    pub kind: TextureKind,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Layer count, `1` for [`TextureKind::Texture2D`].
    pub layers: u32,
    /// Pixel format.
    pub format: TextureFormat,
}

impl TextureDesc {
    /// Bytes of client data for one layer, `None` if it overflows `usize`.
    pub fn layer_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.format.bytes_per_pixel())
    }

    /// Bytes of client data for every layer, `None` if it overflows `usize`.
    pub fn total_size(&self) -> Option<usize> {
        self.layer_size()?.checked_mul(self.layers as usize)
    }
}
