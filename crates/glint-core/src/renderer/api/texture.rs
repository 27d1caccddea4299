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

//! Defines texture views and their sampling parameters.
//!
//! A [`Texture`] is a logical view of a [`SharedImage`]. Several views may share
//! the same image (and therefore the same native texture) while differing only
//! in their [`SamplerState`].

use super::image::{Image, SharedImage};
use std::cell::{Ref, RefMut};

/// The logical texture target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// A 2D texture, one data unit.
    TwoDimensional,
    /// An array of 2D layers, one data unit per layer.
    TwoDimensionalArray,
    /// A 3D texture, one data unit per slice.
    ThreeDimensional,
    /// A cube map, exactly six data units.
    CubeMap,
}

/// Minification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinFilter {
    /// Nearest texel, base level only.
    NearestNoMipMaps,
    /// Bilinear, base level only.
    BilinearNoMipMaps,
    /// Nearest texel from the nearest mip level.
    NearestNearestMipMap,
    /// Bilinear from the nearest mip level.
    BilinearNearestMipMap,
    /// Nearest texel, blended between two mip levels.
    NearestLinearMipMap,
    /// Bilinear, blended between two mip levels.
    #[default]
    Trilinear,
}

impl MinFilter {
    /// Returns `true` if the filter samples mip levels.
    pub const fn uses_mipmap_levels(self) -> bool {
        !matches!(self, MinFilter::NearestNoMipMaps | MinFilter::BilinearNoMipMaps)
    }

    /// The equivalent filter that only samples the base level.
    pub const fn without_mipmaps(self) -> Self {
        match self {
            MinFilter::NearestNoMipMaps
            | MinFilter::NearestNearestMipMap
            | MinFilter::NearestLinearMipMap => MinFilter::NearestNoMipMaps,
            MinFilter::BilinearNoMipMaps
            | MinFilter::BilinearNearestMipMap
            | MinFilter::Trilinear => MinFilter::BilinearNoMipMaps,
        }
    }
}

/// Magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MagFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    #[default]
    Bilinear,
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Repeat the texture.
    Repeat,
    /// Repeat, mirroring every other copy.
    MirroredRepeat,
    /// Clamp to the edge texels.
    #[default]
    EdgeClamp,
    /// Clamp to the border colour.
    BorderClamp,
}

/// A texture coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapAxis {
    /// Horizontal.
    S,
    /// Vertical.
    T,
    /// Depth (3D and cube map textures).
    R,
}

/// Depth comparison applied when sampling a depth texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowCompareMode {
    /// Sample raw depth values.
    #[default]
    Off,
    /// Pass when the reference is less than or equal to the stored depth.
    LessOrEqual,
    /// Pass when the reference is greater than or equal to the stored depth.
    GreaterOrEqual,
}

/// The sampling parameters of a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerState {
    /// Minification filter.
    pub min_filter: MinFilter,
    /// Magnification filter.
    pub mag_filter: MagFilter,
    /// Wrapping along S.
    pub wrap_s: WrapMode,
    /// Wrapping along T.
    pub wrap_t: WrapMode,
    /// Wrapping along R.
    pub wrap_r: WrapMode,
    /// Anisotropy level; 0 means "use the renderer default".
    pub anisotropy: u32,
    /// Depth comparison mode.
    pub shadow_compare: ShadowCompareMode,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: MinFilter::BilinearNoMipMaps,
            mag_filter: MagFilter::Bilinear,
            wrap_s: WrapMode::EdgeClamp,
            wrap_t: WrapMode::EdgeClamp,
            wrap_r: WrapMode::EdgeClamp,
            anisotropy: 0,
            shadow_compare: ShadowCompareMode::Off,
        }
    }
}

/// A sampled view of a shared image.
///
/// Cloning a texture yields a second view of the same image.
#[derive(Debug, Clone)]
pub struct Texture {
    image: SharedImage,
    texture_type: TextureType,
    sampler: SamplerState,
}

impl Texture {
    /// Creates a view of `image` with default sampling.
    pub fn new(texture_type: TextureType, image: SharedImage) -> Self {
        Self::with_sampler(texture_type, image, SamplerState::default())
    }

    /// Creates a 2D view owning a new image.
    pub fn new_2d(image: Image) -> Self {
        Self::new(TextureType::TwoDimensional, image.into_shared())
    }

    /// Creates a view with explicit sampling parameters.
    pub fn with_sampler(texture_type: TextureType, image: SharedImage, sampler: SamplerState) -> Self {
        let texture = Self {
            image,
            texture_type,
            sampler,
        };
        texture.request_mipmaps_if_needed();
        texture
    }

    fn request_mipmaps_if_needed(&self) {
        if self.sampler.min_filter.uses_mipmap_levels() {
            let image = self.image.borrow();
            let needs = !image.has_mipmaps() && !image.is_generated_mipmaps_required();
            drop(image);
            if needs {
                self.image.borrow_mut().set_needs_generated_mipmaps();
            }
        }
    }

    /// The logical target.
    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    /// The shared image handle.
    pub fn shared_image(&self) -> &SharedImage {
        &self.image
    }

    /// Borrows the image.
    pub fn image(&self) -> Ref<'_, Image> {
        self.image.borrow()
    }

    /// Mutably borrows the image.
    pub fn image_mut(&self) -> RefMut<'_, Image> {
        self.image.borrow_mut()
    }

    /// The sampling parameters.
    pub fn sampler(&self) -> &SamplerState {
        &self.sampler
    }

    /// Sets the minification filter, requesting generated mips when it needs them.
    pub fn set_min_filter(&mut self, filter: MinFilter) {
        self.sampler.min_filter = filter;
        self.request_mipmaps_if_needed();
    }

    /// Sets the magnification filter.
    pub fn set_mag_filter(&mut self, filter: MagFilter) {
        self.sampler.mag_filter = filter;
    }

    /// Sets the wrap mode of one axis.
    pub fn set_wrap(&mut self, axis: WrapAxis, mode: WrapMode) {
        match axis {
            WrapAxis::S => self.sampler.wrap_s = mode,
            WrapAxis::T => self.sampler.wrap_t = mode,
            WrapAxis::R => self.sampler.wrap_r = mode,
        }
    }

    /// Sets the wrap mode of every axis.
    pub fn set_wrap_all(&mut self, mode: WrapMode) {
        self.sampler.wrap_s = mode;
        self.sampler.wrap_t = mode;
        self.sampler.wrap_r = mode;
    }

    /// Sets the anisotropy level.
    pub fn set_anisotropy(&mut self, level: u32) {
        self.sampler.anisotropy = level;
    }

    /// Sets the depth comparison mode.
    pub fn set_shadow_compare(&mut self, mode: ShadowCompareMode) {
        self.sampler.shadow_compare = mode;
    }

    /// Returns `true` if both views share the same image.
    pub fn shares_image_with(&self, other: &Texture) -> bool {
        std::rc::Rc::ptr_eq(&self.image, &other.image)
    }
}
