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

use hd_core::renderer::api::{
    BlendFactor, BlendOp, BufferAccess, BufferUsage, CompareFunc, CullFace, FillMode, FilterMode, FrontFace,
    IndexType, NativeFilter, PrimitiveType, SamplerAddressMode, ShaderStage, StencilOp, TextureFormat, TextureKind,
};
use hd_core::renderer::StencilFace;

/// A local extension trait to convert portable render types into OpenGL tokens.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into its OpenGL counterpart.
    fn into_gl(self) -> T;
}

/// The three tokens `glTexImage*` needs for a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    /// Sized internal format.
    pub internal: i32,
    /// Layout of the uploaded pixels.
    pub external: u32,
    /// Component type of the uploaded pixels.
    pub data_type: u32,
}

// --- Buffers ---

impl IntoGl<u32> for BufferUsage {
    fn into_gl(self) -> u32 {
        match self {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
            BufferUsage::Stream => glow::STREAM_DRAW,
        }
    }
}

impl IntoGl<u32> for BufferAccess {
    fn into_gl(self) -> u32 {
        match self {
            BufferAccess::Read => glow::MAP_READ_BIT,
            BufferAccess::Write => glow::MAP_WRITE_BIT,
            BufferAccess::ReadWrite => glow::MAP_READ_BIT | glow::MAP_WRITE_BIT,
        }
    }
}

impl IntoGl<u32> for IndexType {
    fn into_gl(self) -> u32 {
        match self {
            IndexType::Uint => glow::UNSIGNED_INT,
            IndexType::Ushort => glow::UNSIGNED_SHORT,
            IndexType::Ubyte => glow::UNSIGNED_BYTE,
        }
    }
}

impl IntoGl<u32> for PrimitiveType {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveType::Points => glow::POINTS,
            PrimitiveType::LineStrip => glow::LINE_STRIP,
            PrimitiveType::Lines => glow::LINES,
            PrimitiveType::TriangleStrip => glow::TRIANGLE_STRIP,
            PrimitiveType::Triangles => glow::TRIANGLES,
        }
    }
}

// --- Textures and samplers ---

impl IntoGl<u32> for TextureKind {
    fn into_gl(self) -> u32 {
        match self {
            TextureKind::Texture2D => glow::TEXTURE_2D,
            TextureKind::Texture2DArray => glow::TEXTURE_2D_ARRAY,
        }
    }
}

impl IntoGl<GlTextureFormat> for TextureFormat {
    fn into_gl(self) -> GlTextureFormat {
        let (internal, external, data_type) = match self {
            TextureFormat::R8 => (glow::R8, glow::RED, glow::UNSIGNED_BYTE),
            TextureFormat::Rg8 => (glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
            TextureFormat::Rgb8 => (glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
            TextureFormat::Rgba8 => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
            TextureFormat::A8 => (glow::ALPHA, glow::ALPHA, glow::UNSIGNED_BYTE),
            TextureFormat::R16 => (glow::R16, glow::RED, glow::UNSIGNED_SHORT),
            TextureFormat::Rg16 => (glow::RG16, glow::RG, glow::UNSIGNED_SHORT),
            TextureFormat::Rgb16 => (glow::RGB16, glow::RGB, glow::UNSIGNED_SHORT),
            TextureFormat::Rgba16 => (glow::RGBA16, glow::RGBA, glow::UNSIGNED_SHORT),
            TextureFormat::R16F => (glow::R16F, glow::RED, glow::FLOAT),
            TextureFormat::Rg16F => (glow::RG16F, glow::RG, glow::FLOAT),
            TextureFormat::Rgb16F => (glow::RGB16F, glow::RGB, glow::FLOAT),
            TextureFormat::Rgba16F => (glow::RGBA16F, glow::RGBA, glow::FLOAT),
            TextureFormat::R32F => (glow::R32F, glow::RED, glow::FLOAT),
            TextureFormat::Rg32F => (glow::RG32F, glow::RG, glow::FLOAT),
            TextureFormat::Rgb32F => (glow::RGB32F, glow::RGB, glow::FLOAT),
            TextureFormat::Rgba32F => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
            TextureFormat::D16 => (glow::DEPTH_COMPONENT16, glow::DEPTH_COMPONENT, glow::UNSIGNED_SHORT),
            TextureFormat::D24 => (glow::DEPTH_COMPONENT24, glow::DEPTH_COMPONENT, glow::UNSIGNED_INT),
            TextureFormat::D32 => (glow::DEPTH_COMPONENT32, glow::DEPTH_COMPONENT, glow::UNSIGNED_INT),
            TextureFormat::D24S8 => (glow::DEPTH24_STENCIL8, glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8),
        };
        GlTextureFormat {
            internal: internal as i32,
            external,
            data_type,
        }
    }
}

impl IntoGl<i32> for SamplerAddressMode {
    fn into_gl(self) -> i32 {
        let mode = match self {
            SamplerAddressMode::Repeat => glow::REPEAT,
            SamplerAddressMode::Mirror => glow::MIRRORED_REPEAT,
            SamplerAddressMode::Clamp => glow::CLAMP_TO_EDGE,
            SamplerAddressMode::Border => glow::CLAMP_TO_BORDER,
            SamplerAddressMode::MirrorOnce => glow::MIRROR_CLAMP_TO_EDGE,
        };
        mode as i32
    }
}

/// Min and mag filter tokens of a resolved sampler filter.
impl IntoGl<(i32, i32)> for NativeFilter {
    fn into_gl(self) -> (i32, i32) {
        let min = match (self.min, self.mip) {
            (FilterMode::Point, None) => glow::NEAREST,
            (FilterMode::Linear, None) => glow::LINEAR,
            (FilterMode::Point, Some(FilterMode::Point)) => glow::NEAREST_MIPMAP_NEAREST,
            (FilterMode::Point, Some(FilterMode::Linear)) => glow::NEAREST_MIPMAP_LINEAR,
            (FilterMode::Linear, Some(FilterMode::Point)) => glow::LINEAR_MIPMAP_NEAREST,
            (FilterMode::Linear, Some(FilterMode::Linear)) => glow::LINEAR_MIPMAP_LINEAR,
        };
        let mag = match self.mag {
            FilterMode::Point => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
        };
        (min as i32, mag as i32)
    }
}

// --- Fixed-function state ---

impl IntoGl<u32> for CompareFunc {
    fn into_gl(self) -> u32 {
        match self {
            CompareFunc::Never => glow::NEVER,
            CompareFunc::Less => glow::LESS,
            CompareFunc::Equal => glow::EQUAL,
            CompareFunc::LessEqual => glow::LEQUAL,
            CompareFunc::Greater => glow::GREATER,
            CompareFunc::NotEqual => glow::NOTEQUAL,
            CompareFunc::GreaterEqual => glow::GEQUAL,
            CompareFunc::Always => glow::ALWAYS,
        }
    }
}

impl IntoGl<u32> for StencilOp {
    fn into_gl(self) -> u32 {
        match self {
            StencilOp::Keep => glow::KEEP,
            StencilOp::Zero => glow::ZERO,
            StencilOp::Replace => glow::REPLACE,
            StencilOp::IncrSat => glow::INCR,
            StencilOp::DecrSat => glow::DECR,
            StencilOp::Invert => glow::INVERT,
            StencilOp::Incr => glow::INCR_WRAP,
            StencilOp::Decr => glow::DECR_WRAP,
        }
    }
}

impl IntoGl<u32> for StencilFace {
    fn into_gl(self) -> u32 {
        match self {
            StencilFace::Front => glow::FRONT,
            StencilFace::Back => glow::BACK,
        }
    }
}

impl IntoGl<u32> for BlendFactor {
    fn into_gl(self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::InvSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::InvSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DestAlpha => glow::DST_ALPHA,
            BlendFactor::InvDestAlpha => glow::ONE_MINUS_DST_ALPHA,
            BlendFactor::DestColor => glow::DST_COLOR,
            BlendFactor::InvDestColor => glow::ONE_MINUS_DST_COLOR,
            BlendFactor::SrcAlphaSat => glow::SRC_ALPHA_SATURATE,
            BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
            BlendFactor::InvConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        }
    }
}

impl IntoGl<u32> for BlendOp {
    fn into_gl(self) -> u32 {
        match self {
            BlendOp::Add => glow::FUNC_ADD,
            BlendOp::Subtract => glow::FUNC_SUBTRACT,
            BlendOp::RevSubtract => glow::FUNC_REVERSE_SUBTRACT,
            BlendOp::Min => glow::MIN,
            BlendOp::Max => glow::MAX,
        }
    }
}

/// The face to cull, or `None` when culling is disabled.
impl IntoGl<Option<u32>> for CullFace {
    fn into_gl(self) -> Option<u32> {
        match self {
            CullFace::None => None,
            CullFace::Front => Some(glow::FRONT),
            CullFace::Back => Some(glow::BACK),
            CullFace::FrontBack => Some(glow::FRONT_AND_BACK),
        }
    }
}

impl IntoGl<u32> for FillMode {
    fn into_gl(self) -> u32 {
        match self {
            FillMode::Solid => glow::FILL,
            FillMode::Wireframe => glow::LINE,
        }
    }
}

impl IntoGl<u32> for FrontFace {
    fn into_gl(self) -> u32 {
        match self {
            FrontFace::Ccw => glow::CCW,
            FrontFace::Cw => glow::CW,
        }
    }
}

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Pixel => glow::FRAGMENT_SHADER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::renderer::api::{SamplerFilter, TextureFilter};

    #[test]
    fn test_stencil_op_saturation_mapping() {
        assert_eq!(StencilOp::IncrSat.into_gl(), glow::INCR);
        assert_eq!(StencilOp::DecrSat.into_gl(), glow::DECR);
        assert_eq!(StencilOp::Incr.into_gl(), glow::INCR_WRAP);
        assert_eq!(StencilOp::Decr.into_gl(), glow::DECR_WRAP);
    }

    #[test]
    fn test_cull_none_disables_culling() {
        assert_eq!(CullFace::None.into_gl(), None);
        assert_eq!(CullFace::FrontBack.into_gl(), Some(glow::FRONT_AND_BACK));
    }

    #[test]
    fn test_texture_format_conversion() {
        let alpha: GlTextureFormat = TextureFormat::A8.into_gl();
        assert_eq!(alpha.internal, glow::ALPHA as i32);
        assert_eq!(alpha.external, glow::ALPHA);

        let depth_stencil: GlTextureFormat = TextureFormat::D24S8.into_gl();
        assert_eq!(depth_stencil.internal, glow::DEPTH24_STENCIL8 as i32);
        assert_eq!(depth_stencil.data_type, glow::UNSIGNED_INT_24_8);

        let half: GlTextureFormat = TextureFormat::Rgba16F.into_gl();
        assert_eq!(half.data_type, glow::FLOAT);
    }

    #[test]
    fn test_sampler_filter_conversion() {
        let bilinear = TextureFilter::from(SamplerFilter::Bilinear).decompose().unwrap();
        assert_eq!(
            bilinear.into_gl(),
            (glow::LINEAR_MIPMAP_NEAREST as i32, glow::LINEAR as i32)
        );

        let point = TextureFilter::from(SamplerFilter::Point).decompose().unwrap();
        assert_eq!(point.into_gl().1, glow::NEAREST as i32);
    }

    #[test]
    fn test_address_mode_conversion() {
        assert_eq!(SamplerAddressMode::Border.into_gl(), glow::CLAMP_TO_BORDER as i32);
        assert_eq!(SamplerAddressMode::MirrorOnce.into_gl(), glow::MIRROR_CLAMP_TO_EDGE as i32);
    }

    #[test]
    fn test_blend_factor_conversion() {
        assert_eq!(BlendFactor::InvConstantColor.into_gl(), glow::ONE_MINUS_CONSTANT_COLOR);
        assert_eq!(BlendFactor::SrcAlphaSat.into_gl(), glow::SRC_ALPHA_SATURATE);
    }
}
