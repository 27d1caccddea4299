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

//! # Glint Infra
//!
//! The OpenGL implementation of the [`Renderer`](glint_core::Renderer) contract.
//!
//! [`GlRenderer`] sits on top of a [`GlDevice`], a one-call-per-method adapter
//! over the native API. It keeps a mirror of the device state so redundant
//! calls are never issued, uploads dirty resources lazily when they are first
//! used, and reclaims native objects whose owners were dropped.
//!
//! Two devices are provided:
//! - [`GlowDevice`] forwards to a live `glow` context (feature `native`).
//! - [`RecordingDevice`] records every call instead, for headless use and tests.

#![warn(missing_docs)]

pub mod graphics;

#[cfg(feature = "native")]
pub use graphics::gl::backends::GlowDevice;
pub use graphics::gl::backends::{GlCall, RecordingDevice};
pub use graphics::gl::device::GlDevice;
pub use graphics::gl::GlRenderer;
