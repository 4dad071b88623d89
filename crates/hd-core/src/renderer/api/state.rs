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

//! Composite render-state descriptors.
//!
//! Every descriptor is a plain value compared as a whole by the binding cache.
//! Descriptors that carry floats implement [`AbsDiffEq`] and compare their
//! float members within [`STATE_EPSILON`], so insignificant precision noise
//! never causes a redundant native call.

use super::enums::{BlendFactor, BlendMode, BlendOp, CompareFunc, CullFace, FillMode, FrontFace, StencilOp};
use crate::math::STATE_EPSILON;
use approx::AbsDiffEq;

/// The full blend equation, for the color and the alpha channel separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendModeDesc {
    /// Whether blending is enabled at all.
    pub blend_enable: bool,
    /// Factor applied to the source color.
    pub src_blend: BlendFactor,
    /// Factor applied to the destination color.
    pub dst_blend: BlendFactor,
    /// Operation combining the color terms.
    pub blend_op: BlendOp,
    /// Factor applied to the source alpha.
    pub src_blend_alpha: BlendFactor,
    /// Factor applied to the destination alpha.
    pub dst_blend_alpha: BlendFactor,
    /// Operation combining the alpha terms.
    pub blend_op_alpha: BlendOp,
}

impl BlendModeDesc {
    /// Builds a description whose alpha equation mirrors the color equation.
    pub const fn mirrored(blend_enable: bool, src: BlendFactor, dst: BlendFactor, op: BlendOp) -> Self {
        Self {
            blend_enable,
            src_blend: src,
            dst_blend: dst,
            blend_op: op,
            src_blend_alpha: src,
            dst_blend_alpha: dst,
            blend_op_alpha: op,
        }
    }

    /// Builds a description with separate color and alpha equations.
    pub const fn separate(
        src: BlendFactor,
        dst: BlendFactor,
        op: BlendOp,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
        op_alpha: BlendOp,
    ) -> Self {
        Self {
            blend_enable: true,
            src_blend: src,
            dst_blend: dst,
            blend_op: op,
            src_blend_alpha: src_alpha,
            dst_blend_alpha: dst_alpha,
            blend_op_alpha: op_alpha,
        }
    }

    /// Returns `true` if any factor reads the blend constant color.
    pub fn uses_constant(&self) -> bool {
        [self.src_blend, self.dst_blend, self.src_blend_alpha, self.dst_blend_alpha]
            .iter()
            .any(|f| matches!(f, BlendFactor::ConstantColor | BlendFactor::InvConstantColor))
    }
}

impl Default for BlendModeDesc {
    fn default() -> Self {
        BlendMode::Replace.desc()
    }
}

impl BlendMode {
    /// Expands the preset into its full description.
    pub const fn desc(self) -> BlendModeDesc {
        use BlendFactor::*;
        match self {
            BlendMode::Replace => BlendModeDesc::mirrored(false, One, Zero, BlendOp::Add),
            BlendMode::Add => BlendModeDesc::mirrored(true, One, One, BlendOp::Add),
            BlendMode::Multiply => {
                BlendModeDesc::separate(DestColor, Zero, BlendOp::Add, One, Zero, BlendOp::Add)
            }
            BlendMode::Alpha => BlendModeDesc::mirrored(true, SrcAlpha, InvSrcAlpha, BlendOp::Add),
            BlendMode::AddAlpha => BlendModeDesc::mirrored(true, SrcAlpha, One, BlendOp::Add),
            BlendMode::PreMulAlpha => BlendModeDesc::mirrored(true, One, InvSrcAlpha, BlendOp::Add),
            BlendMode::InvDestAlpha => {
                BlendModeDesc::mirrored(true, InvDestAlpha, DestAlpha, BlendOp::Add)
            }
            BlendMode::Subtract => BlendModeDesc::mirrored(true, One, One, BlendOp::RevSubtract),
            BlendMode::SubtractAlpha => {
                BlendModeDesc::mirrored(true, SrcAlpha, One, BlendOp::RevSubtract)
            }
        }
    }
}

impl From<BlendMode> for BlendModeDesc {
    fn from(mode: BlendMode) -> Self {
        mode.desc()
    }
}

/// Per-channel write enable of the color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorMask {
    /// Red.
    pub r: bool,
    /// Green.
    pub g: bool,
    /// Blue.
    pub b: bool,
    /// Alpha.
    pub a: bool,
}

impl ColorMask {
    /// Every channel writable.
    pub const ALL: Self = Self::splat(true);
    /// No channel writable.
    pub const NONE: Self = Self::splat(false);

    /// Same flag for every channel.
    pub const fn splat(rgba: bool) -> Self {
        Self { r: rgba, g: rgba, b: rgba, a: rgba }
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Front and back stencil test description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilTestDesc {
    /// Comparison for front faces.
    pub front_func: CompareFunc,
    /// Front op when the stencil test fails.
    pub front_fail: StencilOp,
    /// Front op when the stencil test passes and the depth test fails.
    pub front_depth_fail: StencilOp,
    /// Front op when both tests pass.
    pub front_pass: StencilOp,
    /// Comparison for back faces.
    pub back_func: CompareFunc,
    /// Back op when the stencil test fails.
    pub back_fail: StencilOp,
    /// Back op when the stencil test passes and the depth test fails.
    pub back_depth_fail: StencilOp,
    /// Back op when both tests pass.
    pub back_pass: StencilOp,
    /// Mask applied to the reference and stored values before comparing.
    pub read_mask: u32,
    /// Mask applied when writing the stencil buffer.
    pub write_mask: u32,
}

impl StencilTestDesc {
    /// Same test on both faces, with full read and write masks.
    pub const fn both_faces(func: CompareFunc, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) -> Self {
        Self {
            front_func: func,
            front_fail: fail,
            front_depth_fail: depth_fail,
            front_pass: pass,
            back_func: func,
            back_fail: fail,
            back_depth_fail: depth_fail,
            back_pass: pass,
            read_mask: u32::MAX,
            write_mask: u32::MAX,
        }
    }

    /// Replaces the read and write masks.
    pub const fn with_masks(mut self, read_mask: u32, write_mask: u32) -> Self {
        self.read_mask = read_mask;
        self.write_mask = write_mask;
        self
    }
}

impl Default for StencilTestDesc {
    fn default() -> Self {
        Self::both_faces(CompareFunc::Always, StencilOp::Keep, StencilOp::Keep, StencilOp::Keep)
    }
}

/// Depth bias applied to filled polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonOffset {
    /// Whether the offset is applied.
    pub enabled: bool,
    /// Slope-scaled factor.
    pub factor: f32,
    /// Constant units.
    pub units: f32,
}

impl PolygonOffset {
    /// Offset disabled.
    pub const DISABLED: Self = Self {
        enabled: false,
        factor: 0.0,
        units: 0.0,
    };

    /// Enabled offset with the given factor and units.
    pub const fn new(factor: f32, units: f32) -> Self {
        Self {
            enabled: true,
            factor,
            units,
        }
    }
}

impl AbsDiffEq for PolygonOffset {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        STATE_EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.enabled == other.enabled
            && self.factor.abs_diff_eq(&other.factor, epsilon)
            && self.units.abs_diff_eq(&other.units, epsilon)
    }
}

impl PartialEq for PolygonOffset {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, STATE_EPSILON)
    }
}

/// Depth test state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    /// Whether the depth test runs.
    pub test_enabled: bool,
    /// Comparison of the test.
    pub func: CompareFunc,
    /// Whether depth writes are enabled.
    pub write_mask: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test_enabled: true,
            func: CompareFunc::Less,
            write_mask: true,
        }
    }
}

/// Stencil test state: enable flag, per-face description and reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StencilState {
    /// Whether the stencil test runs.
    pub enabled: bool,
    /// The per-face test.
    pub desc: StencilTestDesc,
    /// Reference value used by the comparison and `Replace`.
    pub reference: i32,
}

/// Rasterizer state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterizerState {
    /// Culled faces.
    pub cull_face: CullFace,
    /// Polygon fill.
    pub fill_mode: FillMode,
    /// Front winding.
    pub front_face: FrontFace,
    /// Depth bias.
    pub polygon_offset: PolygonOffset,
}

/// A viewport rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Viewport {
    /// Creates a viewport.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_preset_expansion() {
        let desc = BlendMode::Alpha.desc();
        assert!(desc.blend_enable);
        assert_eq!(desc.src_blend, BlendFactor::SrcAlpha);
        assert_eq!(desc.dst_blend, BlendFactor::InvSrcAlpha);
        assert_eq!(desc.blend_op, BlendOp::Add);
        assert_eq!(desc.src_blend_alpha, desc.src_blend);
        assert_eq!(desc.dst_blend_alpha, desc.dst_blend);
        assert_eq!(desc.blend_op_alpha, desc.blend_op);
    }

    #[test]
    fn replace_is_the_default_and_disables_blending() {
        let desc = BlendModeDesc::default();
        assert_eq!(desc, BlendMode::Replace.desc());
        assert!(!desc.blend_enable);
        assert_eq!((desc.src_blend, desc.dst_blend), (BlendFactor::One, BlendFactor::Zero));
    }

    #[test]
    fn multiply_keeps_destination_alpha() {
        let desc = BlendMode::Multiply.desc();
        assert_eq!(desc.src_blend, BlendFactor::DestColor);
        assert_eq!(desc.dst_blend, BlendFactor::Zero);
        assert_eq!(desc.src_blend_alpha, BlendFactor::One);
        assert_eq!(desc.dst_blend_alpha, BlendFactor::Zero);
    }

    #[test]
    fn subtract_presets_use_reverse_subtract() {
        assert_eq!(BlendMode::Subtract.desc().blend_op, BlendOp::RevSubtract);
        assert_eq!(BlendMode::SubtractAlpha.desc().src_blend, BlendFactor::SrcAlpha);
    }

    #[test]
    fn polygon_offset_compares_with_epsilon() {
        let a = PolygonOffset::new(1.0, 2.0);
        let close = PolygonOffset::new(1.0 + f32::EPSILON * 0.5, 2.0);
        let far = PolygonOffset::new(1.001, 2.0);
        assert_eq!(a, close);
        assert_ne!(a, far);
        assert_ne!(a, PolygonOffset { enabled: false, ..a });
    }

    #[test]
    fn stencil_masks_are_kept_separately() {
        let desc = StencilTestDesc::default().with_masks(0x0f, 0xf0);
        assert_eq!(desc.read_mask, 0x0f);
        assert_eq!(desc.write_mask, 0xf0);
    }

    #[test]
    fn constant_factor_detection() {
        let desc = BlendModeDesc::mirrored(true, BlendFactor::ConstantColor, BlendFactor::Zero, BlendOp::Add);
        assert!(desc.uses_constant());
        assert!(!BlendMode::Alpha.desc().uses_constant());
    }
}
