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

//! Capability negotiation.
//!
//! The device is queried once. A feature is detected by its core version first
//! and by its extension(s) second; limits are only queried for features the
//! device actually has.

use super::device::GlDevice;
use super::enums as gl;
use glint_core::renderer::api::{Capabilities, Caps, Limits};
use glint_core::renderer::RenderError;
use std::collections::HashSet;

const OPENGL_TIERS: [((u32, u32), Caps); 6] = [
    ((2, 0), Caps::OPENGL20),
    ((2, 1), Caps::OPENGL21),
    ((3, 0), Caps::OPENGL30),
    ((3, 1), Caps::OPENGL31),
    ((3, 2), Caps::OPENGL32),
    ((3, 3), Caps::OPENGL33),
];

const GLSL_TIERS: [(u32, Caps); 6] = [
    (110, Caps::GLSL110),
    (120, Caps::GLSL120),
    (130, Caps::GLSL130),
    (140, Caps::GLSL140),
    (150, Caps::GLSL150),
    (330, Caps::GLSL330),
];

/// Parses the leading `major.minor` of a `GL_VERSION` string.
///
/// Vendor prefixes such as `"OpenGL ES "` are skipped.
pub fn parse_gl_version(version: &str) -> Option<(u32, u32)> {
    let start = version.find(|c: char| c.is_ascii_digit())?;
    let mut parts = version[start..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|p| !p.is_empty());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor))
}

/// Parses a `GL_SHADING_LANGUAGE_VERSION` string into its numeric form
/// (`"4.60 NVIDIA"` gives 460, `"1.20"` gives 120).
pub fn parse_glsl_version(version: &str) -> Option<u32> {
    let start = version.find(|c: char| c.is_ascii_digit())?;
    let rest = &version[start..];
    let (major, minor) = rest.split_once('.')?;
    let major: u32 = major.parse().ok()?;
    let minor_digits: String = minor.chars().take_while(char::is_ascii_digit).take(2).collect();
    let minor: u32 = match minor_digits.len() {
        0 => return None,
        1 => minor_digits.parse::<u32>().ok()? * 10,
        _ => minor_digits.parse().ok()?,
    };
    Some(major * 100 + minor)
}

struct Probe<'a, D: GlDevice> {
    device: &'a mut D,
    version: (u32, u32),
    extensions: HashSet<String>,
}

impl<D: GlDevice> Probe<'_, D> {
    fn has_ext(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// Core version first, then every listed extension.
    fn core_or(&self, version: (u32, u32), extensions: &[&str]) -> bool {
        self.version >= version || (!extensions.is_empty() && extensions.iter().all(|e| self.has_ext(e)))
    }

    fn core_or_any(&self, version: (u32, u32), extensions: &[&str]) -> bool {
        self.version >= version || extensions.iter().any(|e| self.has_ext(e))
    }

    fn limit(&mut self, pname: u32) -> u32 {
        self.device.get_integer(pname).max(0) as u32
    }
}

/// Queries the device and builds its immutable capability set.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedDevice`] for devices below OpenGL 2.0 or
/// without a parsable shading language version.
pub fn negotiate<D: GlDevice>(device: &mut D) -> Result<Capabilities, RenderError> {
    let version_string = device.get_string(gl::VERSION);
    let version = parse_gl_version(&version_string).ok_or_else(|| {
        RenderError::UnsupportedDevice(format!("cannot parse GL version '{version_string}'"))
    })?;
    if version < (2, 0) {
        return Err(RenderError::UnsupportedDevice(format!(
            "OpenGL 2.0 or later is required, the device reports {}.{}",
            version.0, version.1
        )));
    }

    let glsl_string = device.get_string(gl::SHADING_LANGUAGE_VERSION);
    if glsl_string.trim().is_empty() {
        return Err(RenderError::UnsupportedDevice(
            "the device does not report a shading language version".to_owned(),
        ));
    }
    let glsl_version = parse_glsl_version(&glsl_string).ok_or_else(|| {
        RenderError::UnsupportedDevice(format!(
            "cannot parse shading language version '{glsl_string}'"
        ))
    })?;

    let vendor = device.get_string(gl::VENDOR);
    let renderer = device.get_string(gl::RENDERER);
    let extensions = device.extensions();
    let mut probe = Probe {
        device,
        version,
        extensions,
    };

    let mut caps = Caps::EMPTY;
    let mut limits = Limits::default();

    for (tier, flag) in OPENGL_TIERS {
        caps.set(flag, version >= tier);
    }
    // Some drivers misreport the lowest tier, it is always assumed.
    caps.insert(Caps::GLSL100);
    for (tier, flag) in GLSL_TIERS {
        caps.set(flag, glsl_version >= tier);
    }

    limits.vertex_texture_units = probe.limit(gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS);
    caps.set(Caps::VERTEX_TEXTURE_FETCH, limits.vertex_texture_units > 0);
    limits.fragment_texture_units = probe.limit(gl::MAX_TEXTURE_IMAGE_UNITS);
    limits.vertex_uniform_vectors = probe.limit(gl::MAX_VERTEX_UNIFORM_COMPONENTS) / 4;
    limits.fragment_uniform_vectors = probe.limit(gl::MAX_FRAGMENT_UNIFORM_COMPONENTS) / 4;
    limits.vertex_attributes = probe.limit(gl::MAX_VERTEX_ATTRIBS);
    limits.texture_size = probe.limit(gl::MAX_TEXTURE_SIZE);
    limits.cubemap_size = probe.limit(gl::MAX_CUBE_MAP_TEXTURE_SIZE);

    if version >= (3, 2) {
        let mask = probe.device.get_integer(gl::CONTEXT_PROFILE_MASK);
        caps.set(Caps::CORE_PROFILE, mask & gl::CONTEXT_CORE_PROFILE_BIT != 0);
    }

    caps.set(
        Caps::FLOAT_TEXTURE,
        probe.core_or((3, 0), &["GL_ARB_texture_float", "GL_ARB_half_float_pixel"]),
    );
    caps.set(
        Caps::FLOAT_COLOR_BUFFER,
        probe.core_or((3, 0), &["GL_ARB_color_buffer_float"]),
    );
    caps.set(
        Caps::FLOAT_DEPTH_BUFFER,
        probe.core_or_any(
            (3, 0),
            &["GL_ARB_depth_buffer_float", "GL_NV_depth_buffer_float"],
        ),
    );
    let packed_float = probe.core_or((3, 0), &["GL_EXT_packed_float"]);
    caps.set(Caps::PACKED_FLOAT_TEXTURE, packed_float);
    caps.set(Caps::PACKED_FLOAT_COLOR_BUFFER, packed_float);
    caps.set(
        Caps::SHARED_EXPONENT_TEXTURE,
        probe.core_or((3, 0), &["GL_EXT_texture_shared_exponent"]),
    );
    caps.set(
        Caps::PACKED_DEPTH_STENCIL_BUFFER,
        probe.core_or((3, 0), &["GL_EXT_packed_depth_stencil"]),
    );
    caps.set(
        Caps::TEXTURE_ARRAY,
        probe.core_or((3, 0), &["GL_EXT_texture_array"]),
    );
    caps.set(
        Caps::INTEGER_TEXTURE,
        probe.core_or((3, 0), &["GL_EXT_texture_integer"]),
    );
    caps.set(
        Caps::VERTEX_BUFFER_ARRAY,
        probe.core_or((3, 0), &["GL_ARB_vertex_array_object"]),
    );
    caps.set(
        Caps::MESH_INSTANCING,
        probe.core_or((3, 3), &["GL_ARB_draw_instanced", "GL_ARB_instanced_arrays"]),
    );
    caps.set(
        Caps::SRGB,
        probe.core_or((3, 0), &["GL_ARB_framebuffer_sRGB", "GL_EXT_texture_sRGB"]),
    );
    caps.set(
        Caps::SEAMLESS_CUBEMAP,
        probe.core_or((3, 2), &["GL_ARB_seamless_cube_map"]),
    );
    caps.set(
        Caps::DEPTH_TEXTURE,
        probe.core_or((2, 0), &["GL_ARB_depth_texture"]),
    );

    let npot = probe.core_or((2, 0), &["GL_ARB_texture_non_power_of_two"]);
    caps.set(Caps::NON_POWER_OF_TWO_TEXTURES, npot);
    if !npot {
        log::warn!("Your graphics card does not support non-power-of-2 textures. Some features might not work.");
    }

    caps.set(
        Caps::TEXTURE_COMPRESSION_S3TC,
        probe.has_ext("GL_EXT_texture_compression_s3tc"),
    );
    caps.set(
        Caps::TEXTURE_COMPRESSION_LATC,
        probe.has_ext("GL_EXT_texture_compression_latc"),
    );
    caps.set(
        Caps::TEXTURE_COMPRESSION_ETC1,
        probe.has_ext("GL_OES_compressed_ETC1_RGB8_texture"),
    );
    caps.set(
        Caps::TEXTURE_COMPRESSION_ETC2,
        probe.has_ext("GL_ARB_ES3_compatibility"),
    );

    if probe.has_ext("GL_EXT_texture_filter_anisotropic") {
        caps.insert(Caps::TEXTURE_FILTER_ANISOTROPIC);
        let max = probe.device.get_float(gl::MAX_TEXTURE_MAX_ANISOTROPY);
        limits.max_anisotropy = (max as u32).max(1);
    }

    if probe.core_or((3, 0), &["GL_EXT_framebuffer_object"]) {
        caps.insert(Caps::FRAME_BUFFER);
        limits.renderbuffer_size = probe.limit(gl::MAX_RENDERBUFFER_SIZE);
        limits.color_attachments = probe.limit(gl::MAX_COLOR_ATTACHMENTS).max(1);

        if probe.core_or((3, 0), &["GL_EXT_framebuffer_blit"]) {
            caps.insert(Caps::FRAME_BUFFER_BLIT);
        }
        if probe.core_or((3, 0), &["GL_EXT_framebuffer_multisample"]) {
            caps.insert(Caps::FRAME_BUFFER_MULTISAMPLE);
            limits.framebuffer_samples = probe.limit(gl::MAX_SAMPLES).max(1);
        }
        if probe.core_or((3, 2), &["GL_ARB_texture_multisample"]) {
            caps.insert(Caps::TEXTURE_MULTISAMPLE);
            limits.color_texture_samples = probe.limit(gl::MAX_COLOR_TEXTURE_SAMPLES).max(1);
            limits.depth_texture_samples = probe.limit(gl::MAX_DEPTH_TEXTURE_SAMPLES).max(1);
        }

        limits.draw_buffers = probe.limit(gl::MAX_DRAW_BUFFERS).max(1);
        caps.set(Caps::FRAME_BUFFER_MRT, limits.draw_buffers > 1);
    }

    caps.set(Caps::MULTISAMPLE, probe.device.get_integer(gl::SAMPLES) > 0);

    log::info!(
        "OpenGL Renderer Information\n * Vendor: {vendor}\n * Renderer: {renderer}\n * OpenGL Version: {version_string}\n * GLSL Version: {glsl_string}\n * Profile: {}",
        if caps.contains(Caps::CORE_PROFILE) { "Core" } else { "Compatibility" }
    );
    log::debug!("Supported capabilities: {caps:?}");

    Ok(Capabilities {
        caps,
        limits,
        gl_version: version,
        glsl_version,
        vendor,
        renderer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_version_strings() {
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 535.54"), Some((4, 6)));
        assert_eq!(parse_gl_version("3.3 (Core Profile) Mesa 23.1"), Some((3, 3)));
        assert_eq!(parse_gl_version("OpenGL ES 3.0 Mesa"), Some((3, 0)));
        assert_eq!(parse_gl_version("2"), Some((2, 0)));
        assert_eq!(parse_gl_version("unknown"), None);
    }

    #[test]
    fn glsl_version_strings() {
        assert_eq!(parse_glsl_version("4.60 NVIDIA"), Some(460));
        assert_eq!(parse_glsl_version("1.20"), Some(120));
        assert_eq!(parse_glsl_version("1.5"), Some(150));
        assert_eq!(parse_glsl_version("OpenGL ES GLSL ES 3.00"), Some(300));
        assert_eq!(parse_glsl_version(""), None);
        assert_eq!(parse_glsl_version("garbage"), None);
    }
}
