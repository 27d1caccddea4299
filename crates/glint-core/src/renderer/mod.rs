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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" spoken between the scene/material
//! layer and a native rendering backend. It contains the CPU-side resource
//! descriptors (buffers, images, textures, shaders, framebuffers, meshes), the
//! [`RenderState`] value type, the negotiated [`Capabilities`], the error
//! hierarchy and the [`Renderer`] trait.
//!
//! This module defines the 'what' of rendering, while the 'how' is handled by a
//! concrete backend in the `glint-infra` crate, which implements [`Renderer`] on
//! top of an immediate-mode device.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{FramebufferError, RenderError, ResourceError, ShaderError};
pub use self::traits::Renderer;
