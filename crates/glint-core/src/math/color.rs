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

//! Linear RGBA colour, used for the clear colour.

use serde::{Deserialize, Serialize};

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// A colour in linear space with straight (non-premultiplied) alpha.
///
/// The layout is `#[repr(C)]` so a colour can be uploaded as a `vec4` uniform.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable,
)]
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
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a colour from all four components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// The components as an array, in `r, g, b, a` order.
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Creates an opaque colour from sRGB-encoded components.
    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgb(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// The sRGB-encoded components, alpha untouched.
    pub fn to_srgb(self) -> [f32; 4] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
            self.a,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn srgb_mid_grey_is_darker_in_linear_space() {
        let grey = LinearRgba::from_srgb(0.5, 0.5, 0.5);
        assert_relative_eq!(grey.r, 0.214_041, epsilon = 1e-5);
        assert_relative_eq!(grey.a, 1.0);
    }

    #[test]
    fn srgb_encoding_inverts_decoding() {
        let color = LinearRgba::from_srgb(0.2, 0.6, 1.0);
        let [r, g, b, _] = color.to_srgb();
        assert_relative_eq!(r, 0.2, epsilon = 1e-5);
        assert_relative_eq!(g, 0.6, epsilon = 1e-5);
        assert_relative_eq!(b, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn casts_to_four_floats() {
        let color = LinearRgba::new(0.1, 0.2, 0.3, 0.4);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&color));
        assert_eq!(floats, &[0.1, 0.2, 0.3, 0.4]);
    }
}
