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

//! Texture uploads, sub-image updates and sampler parameters.
//!
//! Every data unit of an image is one face (cube maps) or one slice (arrays and
//! 3D images). A unit holds its mip levels back to back, sized by
//! `mipmap_sizes`. An empty unit allocates storage without uploading pixels,
//! which is how render-target images are created.

use super::{backend_error, gl_size, GlRenderer};
use crate::graphics::gl::context::MAX_TEXTURE_UNITS;
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use crate::graphics::gl::formats::GlImageFormat;
use glint_core::renderer::api::{Caps, ColorSpace, Image, Texture, TextureType};
use glint_core::renderer::{RenderError, ResourceError};

/// The level count used when the device generates the chain.
const GENERATED_MAX_LEVEL: i32 = 1000;

/// Splits one data unit into its mip levels.
///
/// An empty unit yields a single storage-only level.
fn split_levels<'a>(
    unit: &'a [u8],
    sizes: Option<&[usize]>,
) -> Result<Vec<Option<&'a [u8]>>, RenderError> {
    if unit.is_empty() {
        return Ok(vec![None]);
    }
    let Some(sizes) = sizes else {
        return Ok(vec![Some(unit)]);
    };

    let mut levels = Vec::with_capacity(sizes.len());
    let mut offset = 0usize;
    for (level, &size) in sizes.iter().enumerate() {
        let end = offset.saturating_add(size);
        let Some(bytes) = unit.get(offset..end) else {
            return Err(RenderError::PreconditionViolation(format!(
                "mip level {level} needs bytes {offset}..{end} but the data unit holds {}",
                unit.len()
            )));
        };
        levels.push(Some(bytes));
        offset = end;
    }
    Ok(levels)
}

fn has_pixels(image: &Image) -> bool {
    image.data().iter().any(|unit| !unit.is_empty())
}

/// The extent of mip `level` along an axis of base size `size`.
fn level_extent(size: u32, level: usize) -> u32 {
    u32::try_from(level)
        .ok()
        .and_then(|shift| size.checked_shr(shift))
        .unwrap_or(0)
        .max(1)
}

impl<D: GlDevice> GlRenderer<D> {
    fn check_texture_unit(&self, unit: u32) -> Result<(), RenderError> {
        let limit = self.caps.limits.fragment_texture_units;
        if unit as usize >= MAX_TEXTURE_UNITS || (limit > 0 && unit >= limit) {
            return Err(RenderError::PreconditionViolation(format!(
                "texture unit {unit} is out of range"
            )));
        }
        Ok(())
    }

    /// Selects `unit` and binds `name` to it. Returns `true` if the binding changed.
    pub(super) fn bind_texture_to_unit(&mut self, unit: u32, target: u32, name: u32) -> bool {
        if self.context.active_texture_unit != Some(unit) {
            self.device.active_texture(gl::TEXTURE0 + unit);
            self.context.active_texture_unit = Some(unit);
        }
        let slot = &mut self.context.textures[unit as usize];
        if *slot == Some(name) {
            return false;
        }
        self.device.bind_texture(target, Some(name));
        *slot = Some(name);
        true
    }

    /// Resolves the native target of a texture view, checking the capabilities it needs.
    fn texture_target(&self, texture_type: TextureType, image: &Image) -> Result<u32, RenderError> {
        if image.is_multisampled() {
            if !self.caps.has(Caps::TEXTURE_MULTISAMPLE) {
                return Err(RenderError::UnsupportedOperation(
                    "multisample textures".to_string(),
                ));
            }
            if texture_type != TextureType::TwoDimensional {
                return Err(RenderError::PreconditionViolation(format!(
                    "multisample {texture_type:?} textures are not supported"
                )));
            }
            return Ok(gl::TEXTURE_2D_MULTISAMPLE);
        }
        if texture_type == TextureType::TwoDimensionalArray && !self.caps.has(Caps::TEXTURE_ARRAY) {
            return Err(RenderError::UnsupportedOperation(
                "2D texture arrays".to_string(),
            ));
        }
        Ok(texture_type.into_gl())
    }

    fn check_texture_size(&self, texture_type: TextureType, image: &Image) -> Result<(), RenderError> {
        let (what, max) = if texture_type == TextureType::CubeMap {
            ("cube map", self.caps.limits.cubemap_size)
        } else {
            ("texture", self.caps.limits.texture_size)
        };
        if image.width() > max || image.height() > max {
            return Err(ResourceError::TooLarge {
                what,
                width: image.width(),
                height: image.height(),
                max,
            }
            .into());
        }
        if texture_type == TextureType::CubeMap && image.width() != image.height() {
            return Err(RenderError::PreconditionViolation(format!(
                "cube map faces must be square, got {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(())
    }

    fn image_format(&self, image: &Image) -> Result<GlImageFormat, RenderError> {
        let srgb = self.linearize_srgb && image.color_space() == ColorSpace::Srgb;
        self.formats.lookup(image.format(), srgb)
    }

    /// Uploads the image of `texture` if it is new or dirty, leaving it bound to `unit`.
    pub(super) fn ensure_texture(&mut self, texture: &Texture, unit: u32) -> Result<(), RenderError> {
        self.upload_image(texture, unit).map(|_| ())
    }

    /// Returns the native name and target of the image.
    fn upload_image(&mut self, texture: &Texture, unit: u32) -> Result<(u32, u32), RenderError> {
        self.check_texture_unit(unit)?;
        let texture_type = texture.texture_type();
        let image = texture.image();
        let target = self.texture_target(texture_type, &image)?;

        if let Some(handle) = image.object().handle() {
            if !image.object().is_update_needed() {
                let pending = image.is_generated_mipmaps_required()
                    && !image.is_mipmaps_generated()
                    && !image.is_multisampled()
                    && has_pixels(&image);
                drop(image);
                if pending {
                    self.generate_pending_mipmaps(texture, unit, target, handle.0);
                }
                return Ok((handle.0, target));
            }
        }

        self.check_texture_size(texture_type, &image)?;
        let format = self.image_format(&image)?;

        let name = match image.object().handle() {
            Some(handle) => handle.0,
            None => {
                let name = self.device.create_texture().map_err(backend_error)?;
                self.track(image.object(), name);
                name
            }
        };
        self.bind_texture_to_unit(unit, target, name);

        if texture_type == TextureType::CubeMap && image.data().len() != 6 {
            log::warn!(
                "Invalid texture {:?}: cube map textures must contain 6 data units, got {}",
                image.object().id(),
                image.data().len()
            );
            return Ok((name, target));
        }

        let wants_chain = image.is_generated_mipmaps_required() && !image.is_multisampled();
        // Render targets have no pixels yet, their chain is built when the target is left.
        let generate = wants_chain && has_pixels(&image);
        if target == gl::TEXTURE_2D_MULTISAMPLE {
            self.upload_multisample(target, &image, &format);
        } else {
            let levels = image.mipmap_sizes().map_or(1, <[usize]>::len);
            let max_level = if wants_chain {
                GENERATED_MAX_LEVEL
            } else {
                i32::try_from(levels.saturating_sub(1)).unwrap_or(0)
            };
            self.device
                .tex_parameter_i32(target, gl::TEXTURE_MAX_LEVEL, max_level);

            match texture_type {
                TextureType::TwoDimensional => {
                    let unit = image.data().first().map_or(&[][..], Vec::as_slice);
                    self.upload_2d_levels(target, &image, &format, unit)?;
                }
                TextureType::CubeMap => {
                    for (face, unit) in image.data().iter().enumerate() {
                        let face_target = gl::TEXTURE_CUBE_MAP_POSITIVE_X + face as u32;
                        self.upload_2d_levels(face_target, &image, &format, unit)?;
                    }
                }
                TextureType::TwoDimensionalArray | TextureType::ThreeDimensional => {
                    self.upload_3d_levels(target, texture_type, &image, &format)?;
                }
            }
        }

        if let Some(swizzle) = format.swizzle {
            let params = [
                gl::TEXTURE_SWIZZLE_R,
                gl::TEXTURE_SWIZZLE_G,
                gl::TEXTURE_SWIZZLE_B,
                gl::TEXTURE_SWIZZLE_A,
            ];
            for (param, channel) in params.into_iter().zip(swizzle.channels()) {
                self.device.tex_parameter_i32(target, param, channel as i32);
            }
        }

        if generate {
            self.device.generate_mipmap(target);
        }
        image.object().clear_update_needed()?;
        drop(image);
        if generate {
            texture.image_mut().set_mipmaps_generated(true);
        }
        Ok((name, target))
    }

    /// Builds the chain of a clean image whose filter started asking for mips after upload.
    fn generate_pending_mipmaps(&mut self, texture: &Texture, unit: u32, target: u32, name: u32) {
        self.bind_texture_to_unit(unit, target, name);
        self.device
            .tex_parameter_i32(target, gl::TEXTURE_MAX_LEVEL, GENERATED_MAX_LEVEL);
        self.device.generate_mipmap(target);
        texture.image_mut().set_mipmaps_generated(true);
    }

    fn upload_2d_levels(
        &mut self,
        target: u32,
        image: &Image,
        format: &GlImageFormat,
        unit: &[u8],
    ) -> Result<(), RenderError> {
        for (level, pixels) in split_levels(unit, image.mipmap_sizes())?.into_iter().enumerate() {
            let width = gl_size(level_extent(image.width(), level));
            let height = gl_size(level_extent(image.height(), level));
            let level = gl_size(level as u32);
            if format.compressed {
                let Some(pixels) = pixels else {
                    return Err(RenderError::PreconditionViolation(
                        "compressed images must supply their data".to_string(),
                    ));
                };
                self.device.compressed_tex_image_2d(
                    target,
                    level,
                    format.internal_format,
                    width,
                    height,
                    pixels,
                );
            } else {
                self.device.tex_image_2d(
                    target,
                    level,
                    format.internal_format,
                    width,
                    height,
                    format.format,
                    format.data_type,
                    pixels,
                );
            }
        }
        Ok(())
    }

    /// Uploads arrays and 3D images, one call per level with every slice concatenated.
    fn upload_3d_levels(
        &mut self,
        target: u32,
        texture_type: TextureType,
        image: &Image,
        format: &GlImageFormat,
    ) -> Result<(), RenderError> {
        let units = image.data();
        let depth = if image.depth() > 0 {
            image.depth()
        } else {
            units.len().max(1) as u32
        };

        let mut per_unit = Vec::with_capacity(units.len());
        for unit in units {
            per_unit.push(split_levels(unit, image.mipmap_sizes())?);
        }
        let levels = image.mipmap_sizes().map_or(1, <[usize]>::len);

        for level in 0..levels {
            let slices: Vec<&[u8]> = per_unit
                .iter()
                .filter_map(|unit| unit.get(level).copied().flatten())
                .collect();
            let pixels = (!slices.is_empty()).then(|| slices.concat());

            let width = gl_size(level_extent(image.width(), level));
            let height = gl_size(level_extent(image.height(), level));
            let level_depth = if texture_type == TextureType::ThreeDimensional {
                level_extent(depth, level)
            } else {
                depth
            };
            let level = gl_size(level as u32);
            if format.compressed {
                let Some(pixels) = pixels else {
                    return Err(RenderError::PreconditionViolation(
                        "compressed images must supply their data".to_string(),
                    ));
                };
                self.device.compressed_tex_image_3d(
                    target,
                    level,
                    format.internal_format,
                    width,
                    height,
                    gl_size(level_depth),
                    &pixels,
                );
            } else {
                self.device.tex_image_3d(
                    target,
                    level,
                    format.internal_format,
                    width,
                    height,
                    gl_size(level_depth),
                    format.format,
                    format.data_type,
                    pixels.as_deref(),
                );
            }
        }
        Ok(())
    }

    fn upload_multisample(&mut self, target: u32, image: &Image, format: &GlImageFormat) {
        let max = if image.format().is_depth() {
            self.caps.limits.depth_texture_samples
        } else {
            self.caps.limits.color_texture_samples
        };
        let samples = image.multisamples().min(max.max(1));
        self.device.tex_image_2d_multisample(
            target,
            gl_size(samples),
            format.internal_format,
            gl_size(image.width()),
            gl_size(image.height()),
        );
    }

    /// Applies the sampling parameters of a view to its bound native texture.
    fn apply_sampler(&mut self, texture: &Texture, target: u32, name: u32) {
        if target == gl::TEXTURE_2D_MULTISAMPLE {
            return;
        }
        let mipmapped = {
            let image = texture.image();
            image.has_mipmaps() || image.is_generated_mipmaps_required()
        };
        let sampler = *texture.sampler();
        let anisotropic = self.caps.has(Caps::TEXTURE_FILTER_ANISOTROPIC);
        let max_anisotropy = self.caps.limits.max_anisotropy.max(1);
        let default_anisotropy = self.config.default_anisotropy;

        let device = &mut self.device;
        let cache = self.context.samplers.entry(name).or_default();

        let min_filter = if mipmapped {
            sampler.min_filter
        } else {
            sampler.min_filter.without_mipmaps()
        };
        let min_filter: u32 = min_filter.into_gl();
        if cache.min_filter != Some(min_filter) {
            device.tex_parameter_i32(target, gl::TEXTURE_MIN_FILTER, min_filter as i32);
            cache.min_filter = Some(min_filter);
        }
        let mag_filter: u32 = sampler.mag_filter.into_gl();
        if cache.mag_filter != Some(mag_filter) {
            device.tex_parameter_i32(target, gl::TEXTURE_MAG_FILTER, mag_filter as i32);
            cache.mag_filter = Some(mag_filter);
        }

        let wrap_s: u32 = sampler.wrap_s.into_gl();
        if cache.wrap_s != Some(wrap_s) {
            device.tex_parameter_i32(target, gl::TEXTURE_WRAP_S, wrap_s as i32);
            cache.wrap_s = Some(wrap_s);
        }
        let wrap_t: u32 = sampler.wrap_t.into_gl();
        if cache.wrap_t != Some(wrap_t) {
            device.tex_parameter_i32(target, gl::TEXTURE_WRAP_T, wrap_t as i32);
            cache.wrap_t = Some(wrap_t);
        }
        if target == gl::TEXTURE_3D || target == gl::TEXTURE_CUBE_MAP {
            let wrap_r: u32 = sampler.wrap_r.into_gl();
            if cache.wrap_r != Some(wrap_r) {
                device.tex_parameter_i32(target, gl::TEXTURE_WRAP_R, wrap_r as i32);
                cache.wrap_r = Some(wrap_r);
            }
        }

        if anisotropic {
            let requested = if sampler.anisotropy == 0 {
                default_anisotropy
            } else {
                sampler.anisotropy
            };
            let level = requested.clamp(1, max_anisotropy) as f32;
            if cache.anisotropy != Some(level) {
                device.tex_parameter_f32(target, gl::TEXTURE_MAX_ANISOTROPY, level);
                cache.anisotropy = Some(level);
            }
        }

        let compare: Option<u32> = sampler.shadow_compare.into_gl();
        if cache.compare != Some(compare) {
            match compare {
                Some(func) => {
                    device.tex_parameter_i32(
                        target,
                        gl::TEXTURE_COMPARE_MODE,
                        gl::COMPARE_REF_TO_TEXTURE as i32,
                    );
                    device.tex_parameter_i32(target, gl::TEXTURE_COMPARE_FUNC, func as i32);
                }
                None => {
                    device.tex_parameter_i32(target, gl::TEXTURE_COMPARE_MODE, gl::NONE as i32);
                }
            }
            cache.compare = Some(compare);
        }
    }

    /// Uploads the view if needed, binds it to `unit` and applies its sampling.
    pub(super) fn bind_texture(&mut self, unit: u32, texture: &Texture) -> Result<(), RenderError> {
        let (name, target) = self.upload_image(texture, unit)?;
        let switched = self.bind_texture_to_unit(unit, target, name);
        self.apply_sampler(texture, target, name);

        if let Some(handle) = texture.image().object().handle() {
            self.stats.on_texture_use(handle, switched);
        }
        self.context.active.texture_units.move_to_new(unit);
        Ok(())
    }

    /// Replaces a region of a texture with the data units of `pixels`.
    ///
    /// Unit `i` of `pixels` goes to face `i` of a cube map and to layer `i` of
    /// an array. A 3D texture receives all units as consecutive slices.
    pub(super) fn write_sub_image(
        &mut self,
        texture: &Texture,
        pixels: &Image,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError> {
        self.bind_texture(0, texture)?;

        let format = self.image_format(pixels)?;
        if format.compressed {
            return Err(RenderError::PreconditionViolation(format!(
                "cannot modify a texture with compressed {} pixels",
                pixels.format()
            )));
        }
        let width = gl_size(pixels.width());
        let height = gl_size(pixels.height());
        let slice_size = pixels.width() as usize
            * pixels.height() as usize
            * pixels.format().bits_per_pixel() as usize
            / 8;
        if let Some(short) = pixels.data().iter().find(|unit| unit.len() < slice_size) {
            return Err(RenderError::PreconditionViolation(format!(
                "sub-image data unit holds {} bytes, {slice_size} needed",
                short.len()
            )));
        }

        let texture_type = texture.texture_type();
        let target: u32 = texture_type.into_gl();
        match texture_type {
            TextureType::TwoDimensional => {
                if let Some(unit) = pixels.data().first() {
                    self.device.tex_sub_image_2d(
                        target,
                        0,
                        x,
                        y,
                        width,
                        height,
                        format.format,
                        format.data_type,
                        unit,
                    );
                }
            }
            TextureType::CubeMap => {
                for (face, unit) in pixels.data().iter().enumerate().take(6) {
                    self.device.tex_sub_image_2d(
                        gl::TEXTURE_CUBE_MAP_POSITIVE_X + face as u32,
                        0,
                        x,
                        y,
                        width,
                        height,
                        format.format,
                        format.data_type,
                        unit,
                    );
                }
            }
            TextureType::TwoDimensionalArray => {
                for (layer, unit) in pixels.data().iter().enumerate() {
                    self.device.tex_sub_image_3d(
                        target,
                        0,
                        x,
                        y,
                        gl_size(layer as u32),
                        width,
                        height,
                        1,
                        format.format,
                        format.data_type,
                        unit,
                    );
                }
            }
            TextureType::ThreeDimensional => {
                let slices = pixels.data().concat();
                if !slices.is_empty() {
                    self.device.tex_sub_image_3d(
                        target,
                        0,
                        x,
                        y,
                        0,
                        width,
                        height,
                        gl_size(pixels.data().len() as u32),
                        format.format,
                        format.data_type,
                        &slices,
                    );
                }
            }
        }

        let regenerate = texture.image().is_generated_mipmaps_required();
        if regenerate {
            self.device.generate_mipmap(target);
            texture.image_mut().set_mipmaps_generated(true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_split_consecutively() {
        let data = [0u8, 1, 2, 3, 4, 5, 6];
        let levels = split_levels(&data, Some(&[4, 2, 1])).unwrap();
        assert_eq!(levels, vec![Some(&data[..4]), Some(&data[4..6]), Some(&data[6..])]);
    }

    #[test]
    fn short_mip_chain_is_rejected() {
        let data = [0u8; 5];
        assert!(split_levels(&data, Some(&[4, 2])).is_err());
    }

    #[test]
    fn empty_unit_is_storage_only() {
        assert_eq!(split_levels(&[], Some(&[4, 1])).unwrap(), vec![None]);
    }

    #[test]
    fn level_extents_never_reach_zero() {
        assert_eq!(level_extent(8, 0), 8);
        assert_eq!(level_extent(8, 2), 2);
        assert_eq!(level_extent(8, 5), 1);
        assert_eq!(level_extent(3, 40), 1);
    }
}
