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

//! Portable enums accepted by the render context.
//!
//! None of these carry native values. Backends translate them with exhaustive
//! matches, so adding a variant is a compile error until every backend maps it.

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten occasionally, drawn many times.
    Dynamic,
    /// Rewritten every frame, drawn a few times.
    Stream,
}

/// Access requested when mapping a buffer into client memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferAccess {
    /// The client only reads the mapping.
    Read,
    /// The client only writes the mapping.
    Write,
    /// The client reads and writes the mapping.
    ReadWrite,
}

impl BufferAccess {
    /// Returns `true` if the mapping may be read.
    pub fn readable(self) -> bool {
        matches!(self, BufferAccess::Read | BufferAccess::ReadWrite)
    }

    /// Returns `true` if the mapping may be written.
    pub fn writable(self) -> bool {
        matches!(self, BufferAccess::Write | BufferAccess::ReadWrite)
    }
}

/// Pixel format of a texture.
///
/// Half-float formats are stored as 16 bits per channel on the GPU but are
/// uploaded from 32-bit floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One 8-bit normalized channel.
    R8,
    /// Two 8-bit normalized channels.
    Rg8,
    /// Three 8-bit normalized channels.
    Rgb8,
    /// Four 8-bit normalized channels.
    Rgba8,
    /// One 8-bit alpha channel.
    A8,
    /// One 16-bit normalized channel.
    R16,
    /// Two 16-bit normalized channels.
    Rg16,
    /// Three 16-bit normalized channels.
    Rgb16,
    /// Four 16-bit normalized channels.
    Rgba16,
    /// One half-float channel.
    R16F,
    /// Two half-float channels.
    Rg16F,
    /// Three half-float channels.
    Rgb16F,
    /// Four half-float channels.
    Rgba16F,
    /// One float channel.
    R32F,
    /// Two float channels.
    Rg32F,
    /// Three float channels.
    Rgb32F,
    /// Four float channels.
    Rgba32F,
    /// 16-bit depth.
    D16,
    /// 24-bit depth.
    D24,
    /// 32-bit depth.
    D32,
    /// 24-bit depth with 8-bit stencil.
    D24S8,
}

impl TextureFormat {
    /// Number of channels in the client-side data.
    pub fn channel_count(self) -> usize {
        use TextureFormat::*;
        match self {
            R8 | A8 | R16 | R16F | R32F | D16 | D24 | D32 | D24S8 => 1,
            Rg8 | Rg16 | Rg16F | Rg32F => 2,
            Rgb8 | Rgb16 | Rgb16F | Rgb32F => 3,
            Rgba8 | Rgba16 | Rgba16F | Rgba32F => 4,
        }
    }

    /// Size in bytes of one pixel of client-side data.
    pub fn bytes_per_pixel(self) -> usize {
        use TextureFormat::*;
        let channel_size = match self {
            R8 | Rg8 | Rgb8 | Rgba8 | A8 => 1,
            R16 | Rg16 | Rgb16 | Rgba16 | D16 => 2,
            R16F | Rg16F | Rgb16F | Rgba16F | R32F | Rg32F | Rgb32F | Rgba32F => 4,
            D24 | D32 | D24S8 => 4,
        };
        channel_size * self.channel_count()
    }

    /// Returns `true` for depth and depth-stencil formats.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16 | TextureFormat::D24 | TextureFormat::D32 | TextureFormat::D24S8
        )
    }
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Each vertex is a point.
    Points,
    /// Vertices form one connected line.
    LineStrip,
    /// Every two vertices form a line.
    Lines,
    /// Vertices form a connected triangle strip.
    TriangleStrip,
    /// Every three vertices form a triangle.
    Triangles,
}

/// Element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 32-bit indices.
    Uint,
    /// 16-bit indices.
    Ushort,
    /// 8-bit indices.
    Ubyte,
}

impl IndexType {
    /// Size in bytes of one index.
    pub fn size(self) -> usize {
        match self {
            IndexType::Uint => 4,
            IndexType::Ushort => 2,
            IndexType::Ubyte => 1,
        }
    }
}

/// Comparison used by depth tests, stencil tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunc {
    /// Never passes.
    Never,
    /// Passes if the incoming value is less than the stored value.
    #[default]
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the incoming value is less than or equal to the stored value.
    LessEqual,
    /// Passes if the incoming value is greater than the stored value.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the incoming value is greater than or equal to the stored value.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// Operation applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    /// Keep the stored value.
    #[default]
    Keep,
    /// Set the value to zero.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment, clamping at the maximum.
    IncrSat,
    /// Decrement, clamping at zero.
    DecrSat,
    /// Bitwise invert.
    Invert,
    /// Increment, wrapping to zero.
    Incr,
    /// Decrement, wrapping to the maximum.
    Decr,
}

/// Which faces are discarded before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Culling disabled.
    None,
    /// Discard front faces.
    Front,
    /// Discard back faces.
    #[default]
    Back,
    /// Discard every polygon.
    FrontBack,
}

/// How polygons are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Filled polygons.
    #[default]
    Solid,
    /// Polygon outlines only.
    Wireframe,
}

/// The winding order that makes a triangle front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// A multiplier applied to the source or destination of a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// Source color.
    SrcColor,
    /// `1 - source color`
    InvSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`
    InvSrcAlpha,
    /// Destination alpha.
    DestAlpha,
    /// `1 - destination alpha`
    InvDestAlpha,
    /// Destination color.
    DestColor,
    /// `1 - destination color`
    InvDestColor,
    /// `min(source alpha, 1 - destination alpha)`
    SrcAlphaSat,
    /// The blend constant color.
    ConstantColor,
    /// `1 - blend constant color`
    InvConstantColor,
}

/// How the weighted source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
    /// `src + dst`
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    RevSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

/// Named blend presets, expanded into a full `BlendModeDesc` by `BlendMode::desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Blending disabled.
    #[default]
    Replace,
    /// Additive.
    Add,
    /// Multiply with the destination color.
    Multiply,
    /// Classic alpha blending.
    Alpha,
    /// Additive, weighted by source alpha.
    AddAlpha,
    /// Premultiplied alpha.
    PreMulAlpha,
    /// Weighted by inverse destination alpha.
    InvDestAlpha,
    /// Subtract the source from the destination.
    Subtract,
    /// Subtract the alpha-weighted source from the destination.
    SubtractAlpha,
}

/// A programmable stage of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Pixel (fragment) stage.
    Pixel,
}

impl ShaderStage {
    /// Lowercase stage name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_format_sizes() {
        assert_eq!(TextureFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Rgb16.bytes_per_pixel(), 6);
        assert_eq!(TextureFormat::Rg16F.bytes_per_pixel(), 8);
        assert_eq!(TextureFormat::Rgba32F.bytes_per_pixel(), 16);
        assert_eq!(TextureFormat::D16.bytes_per_pixel(), 2);
        assert_eq!(TextureFormat::D24S8.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::A8.bytes_per_pixel(), 1);
    }

    #[test]
    fn depth_formats_are_flagged() {
        assert!(TextureFormat::D24S8.is_depth());
        assert!(!TextureFormat::R32F.is_depth());
    }

    #[test]
    fn buffer_access_flags() {
        assert!(BufferAccess::Read.readable() && !BufferAccess::Read.writable());
        assert!(BufferAccess::ReadWrite.readable() && BufferAccess::ReadWrite.writable());
        assert!(!BufferAccess::Write.readable());
    }

    #[test]
    fn index_sizes() {
        assert_eq!(IndexType::Uint.size(), 4);
        assert_eq!(IndexType::Ushort.size(), 2);
        assert_eq!(IndexType::Ubyte.size(), 1);
    }
}
