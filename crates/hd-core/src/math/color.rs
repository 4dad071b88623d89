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

//! Defines the `LinearRgba` color type used for clears and blend constants.

use approx::AbsDiffEq;

/// Represents a color in a **linear RGBA** color space using `f32` components.
///
/// `#[repr(C)]` keeps the layout identical to a `[f32; 4]`, which is what the
/// native clear and blend-color entry points expect.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct LinearRgba {
    /// The red component in linear space.
    pub r: f32,
    /// The green component in linear space.
    pub g: f32,
    /// The blue component in linear space.
    pub b: f32,
    /// The alpha (opacity) component.
    pub a: f32,
}

impl LinearRgba {
    /// Opaque white (`[1.0, 1.0, 1.0, 1.0]`).
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black (`[0.0, 0.0, 0.0, 1.0]`).
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Fully transparent black (`[0.0, 0.0, 0.0, 0.0]`).
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new `LinearRgba` with explicit RGBA values.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `LinearRgba` (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns the components as an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for LinearRgba {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl AbsDiffEq for LinearRgba {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        super::STATE_EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.r.abs_diff_eq(&other.r, epsilon)
            && self.g.abs_diff_eq(&other.g, epsilon)
            && self.b.abs_diff_eq(&other.b, epsilon)
            && self.a.abs_diff_eq(&other.a, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constants_are_opaque() {
        assert_eq!(LinearRgba::WHITE.a, 1.0);
        assert_eq!(LinearRgba::BLACK.to_array(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(LinearRgba::TRANSPARENT.a, 0.0);
    }

    #[test]
    fn abs_diff_eq_ignores_noise() {
        let a = LinearRgba::new(0.5, 0.25, 0.125, 1.0);
        let b = LinearRgba::new(0.5 + f32::EPSILON * 0.25, 0.25, 0.125, 1.0);
        assert_abs_diff_eq!(a, b);
        assert!(!a.abs_diff_eq(&LinearRgba::new(0.6, 0.25, 0.125, 1.0), f32::EPSILON));
    }

    #[test]
    fn from_array() {
        let c: LinearRgba = [0.1, 0.2, 0.3, 0.4].into();
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.4]);
    }
}
