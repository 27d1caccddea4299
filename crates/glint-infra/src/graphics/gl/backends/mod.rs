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

//! Device implementations behind the [`GlDevice`](super::device::GlDevice) seam.

#[cfg(feature = "native")]
mod glow;
pub mod recording;

#[cfg(feature = "native")]
pub use self::glow::GlowDevice;
pub use recording::{GlCall, RecordingDevice};
