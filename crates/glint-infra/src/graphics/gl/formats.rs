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

//! Pixel format translation tables.
//!
//! Both tables are plain rows, each gated by a set of capabilities that must be
//! present and a set that must be absent. [`FormatTable::new`] keeps, for every
//! format, the first row whose requirement the negotiated capabilities satisfy.

use super::enums as gl;
use glint_core::renderer::api::{Caps, ImageFormat};
use glint_core::renderer::{RenderError, ResourceError};
use std::collections::HashMap;

/// How a legacy single/dual channel format is expanded when it is stored in a
/// core-profile `RED` or `RG` texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swizzle {
    /// `(0, 0, 0, R)`.
    Alpha,
    /// `(R, R, R, 1)`.
    Luminance,
    /// `(R, R, R, G)`.
    LuminanceAlpha,
}

impl Swizzle {
    /// The source channel for each of the R, G, B and A texture swizzle parameters.
    pub const fn channels(self) -> [u32; 4] {
        match self {
            Swizzle::Alpha => [gl::ZERO, gl::ZERO, gl::ZERO, gl::RED],
            Swizzle::Luminance => [gl::RED, gl::RED, gl::RED, gl::ONE],
            Swizzle::LuminanceAlpha => [gl::RED, gl::RED, gl::RED, gl::GREEN],
        }
    }
}

/// The native description of an abstract pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlImageFormat {
    /// The internal (storage) format.
    pub internal_format: u32,
    /// The transfer format of client pixel data.
    pub format: u32,
    /// The transfer data type of client pixel data.
    pub data_type: u32,
    /// Whether the data is block-compressed and uploaded with the compressed entry points.
    pub compressed: bool,
    /// The channel swizzle to apply after upload, if any.
    pub swizzle: Option<Swizzle>,
}

impl GlImageFormat {
    /// The `(internal, transfer, type)` triple used for reverse lookups.
    pub const fn triple(&self) -> (u32, u32, u32) {
        (self.internal_format, self.format, self.data_type)
    }
}

struct FormatRow {
    format: ImageFormat,
    requires: Caps,
    excludes: Caps,
    gl: GlImageFormat,
}

const fn row(
    format: ImageFormat,
    requires: Caps,
    internal_format: u32,
    transfer: u32,
    data_type: u32,
) -> FormatRow {
    FormatRow {
        format,
        requires,
        excludes: Caps::EMPTY,
        gl: GlImageFormat {
            internal_format,
            format: transfer,
            data_type,
            compressed: false,
            swizzle: None,
        },
    }
}

const fn legacy(
    format: ImageFormat,
    requires: Caps,
    internal_format: u32,
    transfer: u32,
    data_type: u32,
) -> FormatRow {
    let mut row = row(format, requires, internal_format, transfer, data_type);
    row.excludes = Caps::CORE_PROFILE;
    row
}

const fn swizzled(
    format: ImageFormat,
    requires: Caps,
    internal_format: u32,
    transfer: u32,
    data_type: u32,
    swizzle: Swizzle,
) -> FormatRow {
    let mut row = row(
        format,
        requires.with(Caps::CORE_PROFILE),
        internal_format,
        transfer,
        data_type,
    );
    row.gl.swizzle = Some(swizzle);
    row
}

const fn compressed(
    format: ImageFormat,
    requires: Caps,
    internal_format: u32,
    transfer: u32,
) -> FormatRow {
    let mut row = row(format, requires, internal_format, transfer, gl::UNSIGNED_BYTE);
    row.gl.compressed = true;
    row
}

const NONE: Caps = Caps::EMPTY;
const GL20: Caps = Caps::OPENGL20;
const RG: Caps = Caps::OPENGL30;
const FLOAT: Caps = Caps::FLOAT_TEXTURE;
const INT: Caps = Caps::INTEGER_TEXTURE;
const S3TC: Caps = Caps::TEXTURE_COMPRESSION_S3TC;
const ETC2: Caps = Caps::TEXTURE_COMPRESSION_ETC2;
const SRGB: Caps = Caps::SRGB;

use ImageFormat as F;

#[rustfmt::skip]
const LINEAR_ROWS: &[FormatRow] = &[
    // Core profile contexts have no alpha/luminance storage.
    swizzled(F::Alpha8, NONE, gl::R8, gl::RED, gl::UNSIGNED_BYTE, Swizzle::Alpha),
    swizzled(F::Alpha16, NONE, gl::R16, gl::RED, gl::UNSIGNED_SHORT, Swizzle::Alpha),
    swizzled(F::Luminance8, NONE, gl::R8, gl::RED, gl::UNSIGNED_BYTE, Swizzle::Luminance),
    swizzled(F::Luminance16, NONE, gl::R16, gl::RED, gl::UNSIGNED_SHORT, Swizzle::Luminance),
    swizzled(F::Luminance8Alpha8, NONE, gl::RG8, gl::RG, gl::UNSIGNED_BYTE, Swizzle::LuminanceAlpha),
    swizzled(F::Luminance16Alpha16, NONE, gl::RG16, gl::RG, gl::UNSIGNED_SHORT, Swizzle::LuminanceAlpha),
    swizzled(F::Luminance16F, FLOAT, gl::R16F, gl::RED, gl::HALF_FLOAT, Swizzle::Luminance),
    swizzled(F::Luminance32F, FLOAT, gl::R32F, gl::RED, gl::FLOAT, Swizzle::Luminance),
    swizzled(F::Luminance16FAlpha16F, FLOAT, gl::RG16F, gl::RG, gl::HALF_FLOAT, Swizzle::LuminanceAlpha),

    legacy(F::Alpha8, GL20, gl::ALPHA8, gl::ALPHA, gl::UNSIGNED_BYTE),
    legacy(F::Alpha16, GL20, gl::ALPHA16, gl::ALPHA, gl::UNSIGNED_SHORT),
    legacy(F::Luminance8, GL20, gl::LUMINANCE8, gl::LUMINANCE, gl::UNSIGNED_BYTE),
    legacy(F::Luminance16, GL20, gl::LUMINANCE16, gl::LUMINANCE, gl::UNSIGNED_SHORT),
    legacy(F::Luminance8Alpha8, GL20, gl::LUMINANCE8_ALPHA8, gl::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE),
    legacy(F::Luminance16Alpha16, GL20, gl::LUMINANCE16_ALPHA16, gl::LUMINANCE_ALPHA, gl::UNSIGNED_SHORT),
    legacy(F::Luminance16F, FLOAT, gl::LUMINANCE16F, gl::LUMINANCE, gl::HALF_FLOAT),
    legacy(F::Luminance32F, FLOAT, gl::LUMINANCE32F, gl::LUMINANCE, gl::FLOAT),
    legacy(F::Luminance16FAlpha16F, FLOAT, gl::LUMINANCE_ALPHA16F, gl::LUMINANCE_ALPHA, gl::HALF_FLOAT),

    row(F::R8, RG, gl::R8, gl::RED, gl::UNSIGNED_BYTE),
    row(F::RG8, RG, gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
    row(F::R16F, FLOAT.with(RG), gl::R16F, gl::RED, gl::HALF_FLOAT),
    row(F::R32F, FLOAT.with(RG), gl::R32F, gl::RED, gl::FLOAT),
    row(F::RG16F, FLOAT.with(RG), gl::RG16F, gl::RG, gl::HALF_FLOAT),
    row(F::RG32F, FLOAT.with(RG), gl::RG32F, gl::RG, gl::FLOAT),

    row(F::RGB8, GL20, gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
    row(F::RGBA8, GL20, gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
    row(F::RGB565, GL20, gl::RGB8, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
    row(F::BGR8, GL20, gl::RGB8, gl::BGR, gl::UNSIGNED_BYTE),
    row(F::ARGB8, GL20, gl::RGBA8, gl::BGRA, gl::UNSIGNED_INT_8_8_8_8),
    row(F::BGRA8, GL20, gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
    row(F::ABGR8, GL20, gl::RGBA8, gl::RGBA, gl::UNSIGNED_INT_8_8_8_8),
    row(F::RGB16, GL20, gl::RGB16, gl::RGB, gl::UNSIGNED_SHORT),
    row(F::RGBA16, GL20, gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT),
    row(F::ARGB4444, GL20, gl::RGBA4, gl::BGRA, gl::UNSIGNED_SHORT_4_4_4_4),
    row(F::RGB10A2, GL20, gl::RGB10_A2, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV),
    row(F::RGB5A1, NONE, gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),

    row(F::RGB16F, FLOAT, gl::RGB16F, gl::RGB, gl::HALF_FLOAT),
    row(F::RGB32F, FLOAT, gl::RGB32F, gl::RGB, gl::FLOAT),
    row(F::RGBA16F, FLOAT, gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
    row(F::RGBA32F, FLOAT, gl::RGBA32F, gl::RGBA, gl::FLOAT),
    row(F::RGB111110F, Caps::PACKED_FLOAT_TEXTURE, gl::R11F_G11F_B10F, gl::RGB, gl::UNSIGNED_INT_10F_11F_11F_REV),
    row(F::RGB9E5, Caps::SHARED_EXPONENT_TEXTURE, gl::RGB9_E5, gl::RGB, gl::UNSIGNED_INT_5_9_9_9_REV),

    row(F::Depth16, NONE, gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT),
    row(F::Depth24, GL20, gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
    row(F::Depth32, GL20, gl::DEPTH_COMPONENT32, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
    row(F::Depth32F, Caps::FLOAT_DEPTH_BUFFER, gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    row(F::Depth24Stencil8, Caps::PACKED_DEPTH_STENCIL_BUFFER, gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8),

    compressed(F::DXT1, S3TC, gl::COMPRESSED_RGB_S3TC_DXT1, gl::RGB),
    compressed(F::DXT1A, S3TC, gl::COMPRESSED_RGBA_S3TC_DXT1, gl::RGBA),
    compressed(F::DXT3, S3TC, gl::COMPRESSED_RGBA_S3TC_DXT3, gl::RGBA),
    compressed(F::DXT5, S3TC, gl::COMPRESSED_RGBA_S3TC_DXT5, gl::RGBA),
    compressed(F::LTC, Caps::TEXTURE_COMPRESSION_LATC, gl::COMPRESSED_LUMINANCE_LATC1, gl::LUMINANCE),
    compressed(F::LATC, Caps::TEXTURE_COMPRESSION_LATC, gl::COMPRESSED_LUMINANCE_ALPHA_LATC2, gl::LUMINANCE_ALPHA),
    // ETC2 decoders read ETC1 data, prefer them when both are present.
    compressed(F::ETC1, ETC2, gl::COMPRESSED_RGB8_ETC2, gl::RGB),
    compressed(F::ETC1, Caps::TEXTURE_COMPRESSION_ETC1, gl::ETC1_RGB8_OES, gl::RGB),
    compressed(F::ETC2RGB8, ETC2, gl::COMPRESSED_RGB8_ETC2, gl::RGB),
    compressed(F::ETC2RGBA8, ETC2, gl::COMPRESSED_RGBA8_ETC2_EAC, gl::RGBA),

    row(F::R8I, INT, gl::R8I, gl::RED_INTEGER, gl::BYTE),
    row(F::R8UI, INT, gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE),
    row(F::R16I, INT, gl::R16I, gl::RED_INTEGER, gl::SHORT),
    row(F::R16UI, INT, gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT),
    row(F::R32I, INT, gl::R32I, gl::RED_INTEGER, gl::INT),
    row(F::R32UI, INT, gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
    row(F::RGBA8I, INT, gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE),
    row(F::RGBA8UI, INT, gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE),
    row(F::RGBA16I, INT, gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT),
    row(F::RGBA16UI, INT, gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT),
    row(F::RGBA32I, INT, gl::RGBA32I, gl::RGBA_INTEGER, gl::INT),
    row(F::RGBA32UI, INT, gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT),
];

#[rustfmt::skip]
const SRGB_ROWS: &[FormatRow] = &[
    swizzled(F::Luminance8, SRGB, gl::SRGB8, gl::RED, gl::UNSIGNED_BYTE, Swizzle::Luminance),
    swizzled(F::Luminance8Alpha8, SRGB, gl::SRGB8_ALPHA8, gl::RG, gl::UNSIGNED_BYTE, Swizzle::LuminanceAlpha),
    legacy(F::Luminance8, SRGB, gl::SLUMINANCE8, gl::LUMINANCE, gl::UNSIGNED_BYTE),
    legacy(F::Luminance8Alpha8, SRGB, gl::SLUMINANCE8_ALPHA8, gl::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE),

    row(F::RGB8, SRGB, gl::SRGB8, gl::RGB, gl::UNSIGNED_BYTE),
    row(F::RGB565, SRGB, gl::SRGB8, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
    row(F::RGB5A1, SRGB, gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
    row(F::RGBA8, SRGB, gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
    row(F::BGR8, SRGB, gl::SRGB8, gl::BGR, gl::UNSIGNED_BYTE),
    row(F::ABGR8, SRGB, gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_INT_8_8_8_8),
    row(F::ARGB8, SRGB, gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_INT_8_8_8_8),
    row(F::BGRA8, SRGB, gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_BYTE),

    compressed(F::DXT1, SRGB.with(S3TC), gl::COMPRESSED_SRGB_S3TC_DXT1, gl::RGB),
    compressed(F::DXT1A, SRGB.with(S3TC), gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT1, gl::RGBA),
    compressed(F::DXT3, SRGB.with(S3TC), gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT3, gl::RGBA),
    compressed(F::DXT5, SRGB.with(S3TC), gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT5, gl::RGBA),
    compressed(F::ETC2RGB8, SRGB.with(ETC2), gl::COMPRESSED_SRGB8_ETC2, gl::RGB),
    compressed(F::ETC2RGBA8, SRGB.with(ETC2), gl::COMPRESSED_SRGB8_ALPHA8_ETC2_EAC, gl::RGBA),
];

fn select(rows: &[FormatRow], caps: Caps) -> HashMap<ImageFormat, GlImageFormat> {
    let mut selected = HashMap::new();
    for row in rows {
        if caps.contains(row.requires) && !caps.intersects(row.excludes) {
            selected.entry(row.format).or_insert(row.gl);
        }
    }
    selected
}

/// The pixel format mappings available under one negotiated capability set.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    linear: HashMap<ImageFormat, GlImageFormat>,
    srgb: HashMap<ImageFormat, GlImageFormat>,
    reverse: HashMap<(u32, u32, u32), Option<ImageFormat>>,
}

impl FormatTable {
    /// Filters the static rows down to the ones the capabilities allow.
    pub fn new(caps: Caps) -> Self {
        let linear = select(LINEAR_ROWS, caps);
        let srgb = select(SRGB_ROWS, caps);

        // A triple produced by more than one format has no reverse mapping.
        let mut reverse: HashMap<(u32, u32, u32), Option<ImageFormat>> = HashMap::new();
        for (format, mapping) in &linear {
            reverse
                .entry(mapping.triple())
                .and_modify(|entry| *entry = None)
                .or_insert(Some(*format));
        }

        Self {
            linear,
            srgb,
            reverse,
        }
    }

    /// The linear mapping of a format, if the device supports it.
    pub fn get(&self, format: ImageFormat) -> Option<GlImageFormat> {
        self.linear.get(&format).copied()
    }

    /// The colour-corrected mapping of a format, if it has one on this device.
    pub fn get_srgb(&self, format: ImageFormat) -> Option<GlImageFormat> {
        self.srgb.get(&format).copied()
    }

    /// Whether the format has any mapping on this device.
    pub fn is_supported(&self, format: ImageFormat) -> bool {
        self.linear.contains_key(&format)
    }

    /// Resolves the mapping to upload a format with.
    ///
    /// When `srgb` is requested but the format has no colour-corrected
    /// equivalent, a warning is logged and the linear mapping is used.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedFormat`] when the format has no
    /// mapping at all under the negotiated capabilities.
    pub fn lookup(&self, format: ImageFormat, srgb: bool) -> Result<GlImageFormat, RenderError> {
        if srgb {
            if let Some(mapping) = self.get_srgb(format) {
                return Ok(mapping);
            }
            log::warn!("Image format {format} has no sRGB equivalent, using linear format.");
        }
        self.get(format)
            .ok_or_else(|| ResourceError::UnsupportedFormat(format.to_string()).into())
    }

    /// Maps a native triple back to the abstract format that produces it.
    ///
    /// Returns `None` for unknown triples and for triples shared by several formats.
    pub fn reverse(&self, internal_format: u32, format: u32, data_type: u32) -> Option<ImageFormat> {
        self.reverse
            .get(&(internal_format, format, data_type))
            .copied()
            .flatten()
    }

    /// Every supported format, in no particular order.
    pub fn supported(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.linear.keys().copied()
    }
}
