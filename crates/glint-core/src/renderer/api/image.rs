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

//! Defines the CPU-side pixel container shared by textures and render targets.

use super::object::{GpuObject, NativeKind};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An abstract pixel format, independent of any native enumerant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ImageFormat {
    Alpha8,
    Alpha16,
    Luminance8,
    Luminance16,
    Luminance16F,
    Luminance32F,
    Luminance8Alpha8,
    Luminance16Alpha16,
    Luminance16FAlpha16F,
    R8,
    RG8,
    R16F,
    R32F,
    RG16F,
    RG32F,
    RGB8,
    RGB16,
    RGB16F,
    RGB32F,
    BGR8,
    RGB565,
    RGB5A1,
    ARGB4444,
    RGBA8,
    ABGR8,
    ARGB8,
    BGRA8,
    RGBA16,
    RGBA16F,
    RGBA32F,
    RGB10A2,
    RGB111110F,
    RGB9E5,
    Depth16,
    Depth24,
    Depth32,
    Depth32F,
    Depth24Stencil8,
    DXT1,
    DXT1A,
    DXT3,
    DXT5,
    LTC,
    LATC,
    ETC1,
    ETC2RGB8,
    ETC2RGBA8,
    R8I,
    R8UI,
    R16I,
    R16UI,
    R32I,
    R32UI,
    RGBA8I,
    RGBA8UI,
    RGBA16I,
    RGBA16UI,
    RGBA32I,
    RGBA32UI,
}

impl ImageFormat {
    /// Every format, in declaration order.
    pub const ALL: [ImageFormat; 59] = [
        ImageFormat::Alpha8,
        ImageFormat::Alpha16,
        ImageFormat::Luminance8,
        ImageFormat::Luminance16,
        ImageFormat::Luminance16F,
        ImageFormat::Luminance32F,
        ImageFormat::Luminance8Alpha8,
        ImageFormat::Luminance16Alpha16,
        ImageFormat::Luminance16FAlpha16F,
        ImageFormat::R8,
        ImageFormat::RG8,
        ImageFormat::R16F,
        ImageFormat::R32F,
        ImageFormat::RG16F,
        ImageFormat::RG32F,
        ImageFormat::RGB8,
        ImageFormat::RGB16,
        ImageFormat::RGB16F,
        ImageFormat::RGB32F,
        ImageFormat::BGR8,
        ImageFormat::RGB565,
        ImageFormat::RGB5A1,
        ImageFormat::ARGB4444,
        ImageFormat::RGBA8,
        ImageFormat::ABGR8,
        ImageFormat::ARGB8,
        ImageFormat::BGRA8,
        ImageFormat::RGBA16,
        ImageFormat::RGBA16F,
        ImageFormat::RGBA32F,
        ImageFormat::RGB10A2,
        ImageFormat::RGB111110F,
        ImageFormat::RGB9E5,
        ImageFormat::Depth16,
        ImageFormat::Depth24,
        ImageFormat::Depth32,
        ImageFormat::Depth32F,
        ImageFormat::Depth24Stencil8,
        ImageFormat::DXT1,
        ImageFormat::DXT1A,
        ImageFormat::DXT3,
        ImageFormat::DXT5,
        ImageFormat::LTC,
        ImageFormat::LATC,
        ImageFormat::ETC1,
        ImageFormat::ETC2RGB8,
        ImageFormat::ETC2RGBA8,
        ImageFormat::R8I,
        ImageFormat::R8UI,
        ImageFormat::R16I,
        ImageFormat::R16UI,
        ImageFormat::R32I,
        ImageFormat::R32UI,
        ImageFormat::RGBA8I,
        ImageFormat::RGBA8UI,
        ImageFormat::RGBA16I,
        ImageFormat::RGBA16UI,
        ImageFormat::RGBA32I,
        ImageFormat::RGBA32UI,
    ];

    /// Bits per pixel. Block-compressed formats report their average rate.
    pub const fn bits_per_pixel(self) -> u32 {
        use ImageFormat::*;
        match self {
            DXT1 | DXT1A | LTC | ETC1 | ETC2RGB8 => 4,
            Alpha8 | Luminance8 | R8 | R8I | R8UI | DXT3 | DXT5 | LATC | ETC2RGBA8 => 8,
            Alpha16 | Luminance16 | Luminance16F | Luminance8Alpha8 | RG8 | R16F | R16I
            | R16UI | RGB565 | RGB5A1 | ARGB4444 | Depth16 => 16,
            RGB8 | BGR8 | Depth24 => 24,
            Luminance32F | Luminance16Alpha16 | Luminance16FAlpha16F | R32F | RG16F | R32I
            | R32UI | RGBA8 | ABGR8 | ARGB8 | BGRA8 | RGB10A2 | RGB111110F | RGB9E5
            | Depth32 | Depth32F | Depth24Stencil8 | RGBA8I | RGBA8UI => 32,
            RGB16 | RGB16F => 48,
            RG32F | RGBA16 | RGBA16F | RGBA16I | RGBA16UI => 64,
            RGB32F => 96,
            RGBA32F | RGBA32I | RGBA32UI => 128,
        }
    }

    /// Returns `true` for depth and depth/stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            ImageFormat::Depth16
                | ImageFormat::Depth24
                | ImageFormat::Depth32
                | ImageFormat::Depth32F
                | ImageFormat::Depth24Stencil8
        )
    }

    /// Returns `true` for formats carrying a stencil component.
    pub const fn has_stencil(self) -> bool {
        matches!(self, ImageFormat::Depth24Stencil8)
    }

    /// Returns `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            ImageFormat::DXT1
                | ImageFormat::DXT1A
                | ImageFormat::DXT3
                | ImageFormat::DXT5
                | ImageFormat::LTC
                | ImageFormat::LATC
                | ImageFormat::ETC1
                | ImageFormat::ETC2RGB8
                | ImageFormat::ETC2RGBA8
        )
    }

    /// Returns `true` for formats with floating point components.
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            ImageFormat::Luminance16F
                | ImageFormat::Luminance32F
                | ImageFormat::Luminance16FAlpha16F
                | ImageFormat::R16F
                | ImageFormat::R32F
                | ImageFormat::RG16F
                | ImageFormat::RG32F
                | ImageFormat::RGB16F
                | ImageFormat::RGB32F
                | ImageFormat::RGBA16F
                | ImageFormat::RGBA32F
                | ImageFormat::RGB111110F
                | ImageFormat::RGB9E5
                | ImageFormat::Depth32F
        )
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How colour data stored in an image should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Values are linear.
    #[default]
    Linear,
    /// Values are sRGB encoded and may be linearized when sampled.
    Srgb,
}

/// An image shared between several texture views.
pub type SharedImage = Rc<RefCell<Image>>;

/// CPU-side pixel data mirrored by one native texture.
///
/// An image holds one data unit per face or slice: one for a 2D image, six
/// for a cube map and one per layer for arrays and 3D images. Each unit may
/// contain a full mip chain laid out consecutively, described by
/// `mipmap_sizes`. Render target images carry no data at all.
#[derive(Debug, Clone)]
pub struct Image {
    format: ImageFormat,
    width: u32,
    height: u32,
    depth: u32,
    data: Vec<Vec<u8>>,
    mipmap_sizes: Option<Vec<usize>>,
    multisamples: u32,
    color_space: ColorSpace,
    generated_mipmaps_required: bool,
    mipmaps_generated: bool,
    object: GpuObject,
}

impl Image {
    /// Creates an image from its data units.
    pub fn new(
        format: ImageFormat,
        width: u32,
        height: u32,
        data: Vec<Vec<u8>>,
        color_space: ColorSpace,
    ) -> Self {
        Self {
            format,
            width,
            height,
            depth: 0,
            data,
            mipmap_sizes: None,
            multisamples: 1,
            color_space,
            generated_mipmaps_required: false,
            mipmaps_generated: false,
            object: GpuObject::new(NativeKind::Texture),
        }
    }

    /// Creates a single-unit linear 2D image.
    pub fn new_2d(format: ImageFormat, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(format, width, height, vec![data], ColorSpace::Linear)
    }

    /// Creates an image without data, used as a render target.
    pub fn empty(format: ImageFormat, width: u32, height: u32) -> Self {
        Self::new(format, width, height, Vec::new(), ColorSpace::Linear)
    }

    /// Sets the depth of a 3D image.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Declares the byte size of every mip level in each data unit.
    #[must_use]
    pub fn with_mipmap_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.mipmap_sizes = Some(sizes);
        self.generated_mipmaps_required = false;
        self
    }

    /// Sets the sample count of a multisampled render target.
    #[must_use]
    pub fn with_multisamples(mut self, samples: u32) -> Self {
        self.multisamples = samples.max(1);
        self
    }

    /// Wraps the image for sharing between texture views.
    pub fn into_shared(self) -> SharedImage {
        Rc::new(RefCell::new(self))
    }

    /// Replaces every data unit and marks the image for upload.
    pub fn set_data(&mut self, data: Vec<Vec<u8>>) {
        self.data = data;
        self.object.set_update_needed();
    }

    /// Replaces one data unit (or appends it when `index == len`).
    pub fn set_data_unit(&mut self, index: usize, unit: Vec<u8>) {
        if index < self.data.len() {
            self.data[index] = unit;
        } else {
            self.data.push(unit);
        }
        self.object.set_update_needed();
    }

    /// Changes the dimensions. The native texture is re-specified at the next upload.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.object.set_update_needed();
    }

    /// Changes the colour space tag and marks the image for upload.
    pub fn set_color_space(&mut self, color_space: ColorSpace) {
        self.color_space = color_space;
        self.object.set_update_needed();
    }

    /// Requests mip generation if the image has no mip chain of its own.
    ///
    /// Only the request is recorded; the pixels stay valid on the device and the
    /// chain is generated the next time the image is bound.
    pub fn set_needs_generated_mipmaps(&mut self) {
        if !self.has_mipmaps() {
            self.generated_mipmaps_required = true;
            self.mipmaps_generated = false;
        }
    }

    /// Records whether the device-side mip chain is currently generated.
    pub fn set_mipmaps_generated(&mut self, generated: bool) {
        self.mipmaps_generated = generated;
    }

    /// The abstract pixel format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in pixels (3D images only, otherwise 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The data units.
    pub fn data(&self) -> &[Vec<u8>] {
        &self.data
    }

    /// The byte size of each mip level, if a chain is supplied.
    pub fn mipmap_sizes(&self) -> Option<&[usize]> {
        self.mipmap_sizes.as_deref()
    }

    /// Returns `true` if the image supplies its own mip chain.
    pub fn has_mipmaps(&self) -> bool {
        self.mipmap_sizes.is_some()
    }

    /// The sample count, 1 for non-multisampled images.
    pub fn multisamples(&self) -> u32 {
        self.multisamples
    }

    /// Returns `true` for multisampled images.
    pub fn is_multisampled(&self) -> bool {
        self.multisamples > 1
    }

    /// The colour space tag.
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Returns `true` if mip levels must be generated on the device.
    pub fn is_generated_mipmaps_required(&self) -> bool {
        self.generated_mipmaps_required
    }

    /// Returns `true` once the device has generated the mip chain.
    pub fn is_mipmaps_generated(&self) -> bool {
        self.mipmaps_generated
    }

    /// The GPU bookkeeping of this image.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_each_format_once() {
        let set: std::collections::HashSet<_> = ImageFormat::ALL.iter().collect();
        assert_eq!(set.len(), ImageFormat::ALL.len());
    }

    #[test]
    fn format_properties() {
        assert_eq!(ImageFormat::RGBA8.bits_per_pixel(), 32);
        assert_eq!(ImageFormat::RGB32F.bits_per_pixel(), 96);
        assert_eq!(ImageFormat::DXT1.bits_per_pixel(), 4);
        assert!(ImageFormat::Depth24Stencil8.is_depth());
        assert!(ImageFormat::Depth24Stencil8.has_stencil());
        assert!(!ImageFormat::Depth24.has_stencil());
        assert!(ImageFormat::ETC1.is_compressed());
        assert!(!ImageFormat::RGBA8.is_compressed());
        assert!(ImageFormat::RGB111110F.is_float());
        assert_eq!(ImageFormat::RGBA16F.to_string(), "RGBA16F");
    }

    #[test]
    fn generated_mipmaps_only_without_a_chain() {
        let mut img = Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 16]);
        img.object().set_handle(crate::renderer::api::NativeHandle(3));
        img.object().clear_update_needed().unwrap();
        img.set_needs_generated_mipmaps();
        assert!(img.is_generated_mipmaps_required());
        assert!(!img.object().is_update_needed(), "the pixels are still valid");

        let mut with_chain =
            Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 20]).with_mipmap_sizes(vec![16, 4]);
        with_chain.set_needs_generated_mipmaps();
        assert!(!with_chain.is_generated_mipmaps_required());
    }

    #[test]
    fn mutations_mark_the_image_dirty() {
        let mut img = Image::new_2d(ImageFormat::R8, 1, 1, vec![0]);
        img.object().set_handle(crate::renderer::api::NativeHandle(4));
        img.object().clear_update_needed().unwrap();
        img.set_data_unit(0, vec![255]);
        assert!(img.object().is_update_needed());
        assert_eq!(img.data()[0], vec![255]);
    }
}
