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

//! The negotiated capability set.
//!
//! Capabilities are derived once from device queries when the renderer is
//! initialized and never change afterwards. The scene layer may read them to skip
//! render paths the hardware cannot run instead of relying on fatal errors.

use crate::glint_bitflags;

glint_bitflags! {
    /// Optional device features, as negotiated at initialization.
    pub struct Caps: u64 {
        /// OpenGL 2.0 core.
        const OPENGL20 = 1 << 0;
        /// OpenGL 2.1 core.
        const OPENGL21 = 1 << 1;
        /// OpenGL 3.0 core.
        const OPENGL30 = 1 << 2;
        /// OpenGL 3.1 core.
        const OPENGL31 = 1 << 3;
        /// OpenGL 3.2 core.
        const OPENGL32 = 1 << 4;
        /// OpenGL 3.3 core.
        const OPENGL33 = 1 << 5;
        /// GLSL 1.00, always present on a supported device.
        const GLSL100 = 1 << 6;
        /// GLSL 1.10.
        const GLSL110 = 1 << 7;
        /// GLSL 1.20.
        const GLSL120 = 1 << 8;
        /// GLSL 1.30.
        const GLSL130 = 1 << 9;
        /// GLSL 1.40.
        const GLSL140 = 1 << 10;
        /// GLSL 1.50.
        const GLSL150 = 1 << 11;
        /// GLSL 3.30.
        const GLSL330 = 1 << 12;
        /// The context is a core profile context (no legacy formats).
        const CORE_PROFILE = 1 << 13;
        /// Framebuffer objects.
        const FRAME_BUFFER = 1 << 14;
        /// Multiple render targets (more than one simultaneous draw buffer).
        const FRAME_BUFFER_MRT = 1 << 15;
        /// Multisampled renderbuffer storage.
        const FRAME_BUFFER_MULTISAMPLE = 1 << 16;
        /// Blitting between framebuffers.
        const FRAME_BUFFER_BLIT = 1 << 17;
        /// Multisampled textures.
        const TEXTURE_MULTISAMPLE = 1 << 18;
        /// Floating point textures.
        const FLOAT_TEXTURE = 1 << 19;
        /// Floating point colour renderbuffers.
        const FLOAT_COLOR_BUFFER = 1 << 20;
        /// Floating point depth buffers.
        const FLOAT_DEPTH_BUFFER = 1 << 21;
        /// R11F_G11F_B10F textures.
        const PACKED_FLOAT_TEXTURE = 1 << 22;
        /// R11F_G11F_B10F colour renderbuffers.
        const PACKED_FLOAT_COLOR_BUFFER = 1 << 23;
        /// RGB9_E5 textures.
        const SHARED_EXPONENT_TEXTURE = 1 << 24;
        /// Packed depth/stencil formats.
        const PACKED_DEPTH_STENCIL_BUFFER = 1 << 25;
        /// 2D texture arrays.
        const TEXTURE_ARRAY = 1 << 26;
        /// Integer textures.
        const INTEGER_TEXTURE = 1 << 27;
        /// Vertex array objects.
        const VERTEX_BUFFER_ARRAY = 1 << 28;
        /// Instanced draws and per-instance vertex attributes.
        const MESH_INSTANCING = 1 << 29;
        /// sRGB textures and sRGB framebuffer writes.
        const SRGB = 1 << 30;
        /// Seamless filtering across cube map faces.
        const SEAMLESS_CUBEMAP = 1 << 31;
        /// Depth textures.
        const DEPTH_TEXTURE = 1 << 32;
        /// Textures whose sizes are not powers of two.
        const NON_POWER_OF_TWO_TEXTURES = 1 << 33;
        /// S3TC (DXT) compressed textures.
        const TEXTURE_COMPRESSION_S3TC = 1 << 34;
        /// LATC compressed textures.
        const TEXTURE_COMPRESSION_LATC = 1 << 35;
        /// ETC1 compressed textures.
        const TEXTURE_COMPRESSION_ETC1 = 1 << 36;
        /// ETC2 compressed textures.
        const TEXTURE_COMPRESSION_ETC2 = 1 << 37;
        /// Anisotropic texture filtering.
        const TEXTURE_FILTER_ANISOTROPIC = 1 << 38;
        /// Texture sampling from vertex shaders.
        const VERTEX_TEXTURE_FETCH = 1 << 39;
        /// The default framebuffer is multisampled.
        const MULTISAMPLE = 1 << 40;
    }
}

/// Numeric device limits, as negotiated at initialization.
///
/// A limit the device was never asked about (because the matching feature is
/// missing) keeps its neutral default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Texture units available to vertex shaders.
    pub vertex_texture_units: u32,
    /// Texture units available to fragment shaders.
    pub fragment_texture_units: u32,
    /// Uniform vectors available to vertex shaders.
    pub vertex_uniform_vectors: u32,
    /// Uniform vectors available to fragment shaders.
    pub fragment_uniform_vectors: u32,
    /// Vertex attribute slots.
    pub vertex_attributes: u32,
    /// Maximum width/height of a 2D texture.
    pub texture_size: u32,
    /// Maximum width/height of a cube map face.
    pub cubemap_size: u32,
    /// Maximum width/height of a renderbuffer.
    pub renderbuffer_size: u32,
    /// Maximum colour attachments per framebuffer.
    pub color_attachments: u32,
    /// Maximum simultaneous draw buffers.
    pub draw_buffers: u32,
    /// Maximum samples of a multisampled renderbuffer.
    pub framebuffer_samples: u32,
    /// Maximum samples of a multisampled colour texture.
    pub color_texture_samples: u32,
    /// Maximum samples of a multisampled depth texture.
    pub depth_texture_samples: u32,
    /// Maximum anisotropy for texture filtering.
    pub max_anisotropy: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            vertex_texture_units: 0,
            fragment_texture_units: 0,
            vertex_uniform_vectors: 0,
            fragment_uniform_vectors: 0,
            vertex_attributes: 0,
            texture_size: 0,
            cubemap_size: 0,
            renderbuffer_size: 0,
            color_attachments: 1,
            draw_buffers: 1,
            framebuffer_samples: 1,
            color_texture_samples: 1,
            depth_texture_samples: 1,
            max_anisotropy: 1,
        }
    }
}

/// Everything learned about the device at initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Feature flags.
    pub caps: Caps,
    /// Numeric limits.
    pub limits: Limits,
    /// The parsed GL version, as `(major, minor)`.
    pub gl_version: (u32, u32),
    /// The parsed shading language version, e.g. `330` for "3.30".
    pub glsl_version: u32,
    /// The `GL_VENDOR` string.
    pub vendor: String,
    /// The `GL_RENDERER` string.
    pub renderer: String,
}

impl Capabilities {
    /// Returns `true` if every flag in `caps` was negotiated.
    pub fn has(&self, caps: Caps) -> bool {
        self.caps.contains(caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capabilities_are_empty() {
        let caps = Capabilities::default();
        assert!(caps.caps.is_empty());
        assert!(!caps.has(Caps::MESH_INSTANCING));
        assert_eq!(caps.limits.draw_buffers, 1);
        assert_eq!(caps.limits.texture_size, 0);
    }

    #[test]
    fn has_requires_every_flag() {
        let caps = Capabilities {
            caps: Caps::FRAME_BUFFER | Caps::SRGB,
            ..Default::default()
        };
        assert!(caps.has(Caps::FRAME_BUFFER));
        assert!(caps.has(Caps::FRAME_BUFFER | Caps::SRGB));
        assert!(!caps.has(Caps::FRAME_BUFFER | Caps::FRAME_BUFFER_BLIT));
    }
}
