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

//! Global settings for the renderer.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied when a renderer is created.
///
/// Missing fields in a serialized configuration take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Initial state of sRGB image linearization when sampling.
    pub linearize_srgb_images: bool,
    /// Initial state of sRGB encoding for the main framebuffer.
    pub main_framebuffer_srgb: bool,
    /// If `true`, driver info logs are logged after successful compiles and links.
    pub log_shader_info: bool,
    /// The maximum number of orphaned native objects deleted per frame.
    pub max_reclaims_per_frame: usize,
    /// Anisotropy applied to textures that do not request one.
    pub default_anisotropy: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            linearize_srgb_images: false,
            main_framebuffer_srgb: false,
            log_shader_info: false,
            max_reclaims_per_frame: 100,
            default_anisotropy: 0,
        }
    }
}

impl RendererConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid renderer configuration")
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read renderer configuration '{}'", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("failed to parse renderer configuration '{}'", path.display()))?;
        log::info!("Loaded renderer configuration from '{}'", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = RendererConfig::from_json_str(r#"{ "log_shader_info": true }"#).unwrap();
        assert!(config.log_shader_info);
        assert_eq!(config.max_reclaims_per_frame, 100);
        assert!(!config.linearize_srgb_images);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(RendererConfig::from_json_str("{ max_reclaims_per_frame: ").is_err());
        assert!(RendererConfig::load("/nonexistent/glint.json").is_err());
    }

    #[test]
    fn survives_serialization() {
        let config = RendererConfig {
            default_anisotropy: 8,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RendererConfig::from_json_str(&json).unwrap(), config);
    }
}
