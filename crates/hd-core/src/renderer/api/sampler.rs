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

//! Sampler state description and filter decomposition.

use super::enums::CompareFunc;
use crate::math::{LinearRgba, STATE_EPSILON};
use crate::renderer::error::ContractViolation;
use approx::AbsDiffEq;

/// Largest accepted `max_anisotropy`.
pub const MAX_ANISOTROPY: u32 = 16;

/// Named filter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerFilter {
    /// Nearest texel, no mipmapping.
    Point,
    /// Linear, no mipmapping.
    Linear,
    /// Linear within a level, nearest mip level.
    #[default]
    Bilinear,
    /// Linear within and between mip levels.
    Trilinear,
    /// Anisotropic filtering.
    Anisotropic,
}

/// How the texture is addressed outside of `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerAddressMode {
    /// Tile.
    #[default]
    Repeat,
    /// Tile, mirroring every other repetition.
    Mirror,
    /// Clamp to the edge texel.
    Clamp,
    /// Use the border color.
    Border,
    /// Mirror once around zero, then clamp.
    MirrorOnce,
}

/// Filtering of one of the min, mag or mip stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Nearest.
    Point,
    /// Linear.
    Linear,
    /// Anisotropic.
    Anisotropic,
    /// Nearest, with depth comparison.
    ComparisonPoint,
    /// Linear, with depth comparison.
    ComparisonLinear,
    /// Anisotropic, with depth comparison.
    ComparisonAnisotropic,
}

impl FilterKind {
    fn is_anisotropic(self) -> bool {
        matches!(self, FilterKind::Anisotropic | FilterKind::ComparisonAnisotropic)
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            FilterKind::ComparisonPoint | FilterKind::ComparisonLinear | FilterKind::ComparisonAnisotropic
        )
    }

    fn mode(self) -> FilterMode {
        match self {
            FilterKind::Point | FilterKind::ComparisonPoint => FilterMode::Point,
            _ => FilterMode::Linear,
        }
    }

    fn with_comparison(self) -> Self {
        match self {
            FilterKind::Point => FilterKind::ComparisonPoint,
            FilterKind::Linear => FilterKind::ComparisonLinear,
            FilterKind::Anisotropic => FilterKind::ComparisonAnisotropic,
            other => other,
        }
    }
}

/// The interpolation a native sampler applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest.
    Point,
    /// Linear.
    Linear,
}

/// Separate min, mag and mip filters. `mip: None` disables mipmapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFilter {
    /// Minification filter.
    pub min: FilterKind,
    /// Magnification filter.
    pub mag: FilterKind,
    /// Mip level selection.
    pub mip: Option<FilterKind>,
}

/// A [`TextureFilter`] folded into the shape native APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeFilter {
    /// Minification interpolation.
    pub min: FilterMode,
    /// Magnification interpolation.
    pub mag: FilterMode,
    /// Mip interpolation, if mipmapping.
    pub mip: Option<FilterMode>,
    /// Whether anisotropic filtering is on.
    pub anisotropic: bool,
    /// Whether depth comparison is on.
    pub comparison: bool,
}

impl TextureFilter {
    /// Folds the three stages into a [`NativeFilter`].
    ///
    /// All stages must agree on whether anisotropic and comparison sampling
    /// are requested.
    pub fn decompose(&self) -> Result<NativeFilter, ContractViolation> {
        let stages = [Some(self.min), Some(self.mag), self.mip];
        let stages = stages.iter().flatten();

        let anisotropic = self.min.is_anisotropic();
        if stages.clone().any(|s| s.is_anisotropic() != anisotropic) {
            return Err(ContractViolation::FilterMismatch("anisotropic"));
        }
        let comparison = self.min.is_comparison();
        if stages.clone().any(|s| s.is_comparison() != comparison) {
            return Err(ContractViolation::FilterMismatch("comparison"));
        }

        Ok(NativeFilter {
            min: self.min.mode(),
            mag: self.mag.mode(),
            mip: self.mip.map(FilterKind::mode),
            anisotropic,
            comparison,
        })
    }

    fn with_comparison(self) -> Self {
        Self {
            min: self.min.with_comparison(),
            mag: self.mag.with_comparison(),
            mip: self.mip.map(FilterKind::with_comparison),
        }
    }
}

impl From<SamplerFilter> for TextureFilter {
    fn from(filter: SamplerFilter) -> Self {
        use FilterKind::*;
        let (min, mag, mip) = match filter {
            SamplerFilter::Point => (Point, Point, None),
            SamplerFilter::Linear => (Linear, Linear, None),
            SamplerFilter::Bilinear => (Linear, Linear, Some(Point)),
            SamplerFilter::Trilinear => (Linear, Linear, Some(Linear)),
            SamplerFilter::Anisotropic => (Anisotropic, Anisotropic, Some(Anisotropic)),
        };
        Self { min, mag, mip }
    }
}

/// Full description of a sampler state object.
///
/// Built from a preset with [`SamplerDesc::new`] and refined with the
/// `with_*` methods.
#[derive(Debug, Clone, Copy)]
pub struct SamplerDesc {
    /// Min/mag/mip filtering.
    pub filter: TextureFilter,
    /// Anisotropy level, `1..=16`. Only used by anisotropic filters.
    pub max_anisotropy: u32,
    /// Comparison used by comparison filters.
    pub compare_func: CompareFunc,
    /// Addressing along U.
    pub address_u: SamplerAddressMode,
    /// Addressing along V.
    pub address_v: SamplerAddressMode,
    /// Addressing along W.
    pub address_w: SamplerAddressMode,
    /// Bias added to the computed mip level.
    pub lod_bias: f32,
    /// Color returned by `Border` addressing.
    pub border_color: LinearRgba,
    /// Lowest mip level accessible.
    pub min_lod: f32,
    /// Highest mip level accessible.
    pub max_lod: f32,
}

impl SamplerDesc {
    /// Sampler with the given preset and default everything else.
    pub fn new(filter: SamplerFilter) -> Self {
        Self {
            filter: filter.into(),
            max_anisotropy: 1,
            compare_func: CompareFunc::Less,
            address_u: SamplerAddressMode::Repeat,
            address_v: SamplerAddressMode::Repeat,
            address_w: SamplerAddressMode::Repeat,
            lod_bias: 0.0,
            border_color: LinearRgba::TRANSPARENT,
            min_lod: -1000.0,
            max_lod: 1000.0,
        }
    }

    /// Sets the anisotropy level.
    pub fn with_max_anisotropy(mut self, max_anisotropy: u32) -> Self {
        self.max_anisotropy = max_anisotropy;
        self
    }

    /// Turns every filter stage into its comparison variant, comparing with `func`.
    pub fn with_comparison(mut self, func: CompareFunc) -> Self {
        self.filter = self.filter.with_comparison();
        self.compare_func = func;
        self
    }

    /// Same addressing on all three axes.
    pub fn with_address_mode(self, uvw: SamplerAddressMode) -> Self {
        self.with_address_modes(uvw, uvw, uvw)
    }

    /// Separate addressing per axis.
    pub fn with_address_modes(mut self, u: SamplerAddressMode, v: SamplerAddressMode, w: SamplerAddressMode) -> Self {
        self.address_u = u;
        self.address_v = v;
        self.address_w = w;
        self
    }

    /// Sets the mip level bias.
    pub fn with_lod_bias(mut self, lod_bias: f32) -> Self {
        self.lod_bias = lod_bias;
        self
    }

    /// Sets the border color.
    pub fn with_border_color(mut self, color: LinearRgba) -> Self {
        self.border_color = color;
        self
    }

    /// Sets the accessible mip range.
    pub fn with_lod_range(mut self, min_lod: f32, max_lod: f32) -> Self {
        self.min_lod = min_lod;
        self.max_lod = max_lod;
        self
    }

    /// Validates the description and folds its filter.
    pub fn resolve(&self) -> Result<NativeFilter, ContractViolation> {
        if !(1..=MAX_ANISOTROPY).contains(&self.max_anisotropy) {
            return Err(ContractViolation::AnisotropyOutOfRange(self.max_anisotropy));
        }
        self.filter.decompose()
    }
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::new(SamplerFilter::default())
    }
}

impl PartialEq for SamplerDesc {
    fn eq(&self, other: &Self) -> bool {
        self.filter == other.filter
            && self.max_anisotropy == other.max_anisotropy
            && self.compare_func == other.compare_func
            && (self.address_u, self.address_v, self.address_w)
                == (other.address_u, other.address_v, other.address_w)
            && self.lod_bias.abs_diff_eq(&other.lod_bias, STATE_EPSILON)
            && self.border_color.abs_diff_eq(&other.border_color, STATE_EPSILON)
            && self.min_lod.abs_diff_eq(&other.min_lod, STATE_EPSILON)
            && self.max_lod.abs_diff_eq(&other.max_lod, STATE_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_decompose() {
        let point = TextureFilter::from(SamplerFilter::Point).decompose().unwrap();
        assert_eq!((point.min, point.mag, point.mip), (FilterMode::Point, FilterMode::Point, None));

        let bilinear = TextureFilter::from(SamplerFilter::Bilinear).decompose().unwrap();
        assert_eq!(bilinear.min, FilterMode::Linear);
        assert_eq!(bilinear.mip, Some(FilterMode::Point));
        assert!(!bilinear.anisotropic);

        let aniso = TextureFilter::from(SamplerFilter::Anisotropic).decompose().unwrap();
        assert!(aniso.anisotropic);
        assert_eq!(aniso.mip, Some(FilterMode::Linear));
    }

    #[test]
    fn mixed_anisotropy_is_rejected() {
        let filter = TextureFilter {
            min: FilterKind::Anisotropic,
            mag: FilterKind::Linear,
            mip: Some(FilterKind::Linear),
        };
        assert_eq!(filter.decompose(), Err(ContractViolation::FilterMismatch("anisotropic")));
    }

    #[test]
    fn mixed_comparison_is_rejected() {
        let filter = TextureFilter {
            min: FilterKind::ComparisonLinear,
            mag: FilterKind::ComparisonLinear,
            mip: Some(FilterKind::Point),
        };
        assert_eq!(filter.decompose(), Err(ContractViolation::FilterMismatch("comparison")));
    }

    #[test]
    fn comparison_builder_converts_every_stage() {
        let desc = SamplerDesc::new(SamplerFilter::Trilinear).with_comparison(CompareFunc::LessEqual);
        let native = desc.resolve().unwrap();
        assert!(native.comparison);
        assert_eq!(desc.compare_func, CompareFunc::LessEqual);
    }

    #[test]
    fn anisotropy_range_is_checked() {
        let desc = SamplerDesc::new(SamplerFilter::Anisotropic).with_max_anisotropy(32);
        assert_eq!(desc.resolve(), Err(ContractViolation::AnisotropyOutOfRange(32)));
        assert!(SamplerDesc::new(SamplerFilter::Anisotropic)
            .with_max_anisotropy(16)
            .resolve()
            .is_ok());
        assert!(SamplerDesc::default().with_max_anisotropy(0).resolve().is_err());
    }

    #[test]
    fn defaults() {
        let desc = SamplerDesc::default();
        assert_eq!(desc.min_lod, -1000.0);
        assert_eq!(desc.max_lod, 1000.0);
        assert_eq!(desc.address_w, SamplerAddressMode::Repeat);
        assert_eq!(desc, SamplerDesc::new(SamplerFilter::Bilinear));
    }
}
