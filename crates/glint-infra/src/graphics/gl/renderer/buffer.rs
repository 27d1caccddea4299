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

use super::{backend_error, GlRenderer};
use crate::graphics::gl::context::binding;
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use glint_core::renderer::api::{BufferType, Usage, VertexBuffer};
use glint_core::renderer::RenderError;

impl<D: GlDevice> GlRenderer<D> {
    /// Binds `name` to `target` unless the cache says it already is.
    pub(super) fn bind_buffer(&mut self, target: u32, name: u32) {
        let cached = if target == gl::ELEMENT_ARRAY_BUFFER {
            &mut self.context.element_buffer
        } else {
            &mut self.context.array_buffer
        };
        if *cached != Some(name) {
            self.device.bind_buffer(target, binding(name));
            *cached = Some(name);
        }
    }

    /// Uploads a buffer if it is new or dirty and returns its native name.
    ///
    /// The whole store is re-specified when the byte size changed since the last
    /// upload; otherwise the content is replaced in place.
    pub(super) fn upload_buffer(&mut self, buffer: &VertexBuffer) -> Result<u32, RenderError> {
        if buffer.usage() == Usage::CpuOnly {
            return Err(RenderError::PreconditionViolation(format!(
                "{:?} buffer is CPU only and cannot be uploaded",
                buffer.buffer_type()
            )));
        }
        let target = if buffer.buffer_type() == BufferType::Index {
            gl::ELEMENT_ARRAY_BUFFER
        } else {
            gl::ARRAY_BUFFER
        };

        let (name, created) = match buffer.object().handle() {
            Some(handle) => (handle.0, false),
            None => {
                let name = self.device.create_buffer().map_err(backend_error)?;
                self.track(buffer.object(), name);
                (name, true)
            }
        };

        if !buffer.object().is_update_needed() {
            return Ok(name);
        }

        self.bind_buffer(target, name);
        if created || buffer.has_data_size_changed() {
            self.device
                .buffer_data(target, buffer.data(), buffer.usage().into_gl());
        } else {
            self.device.buffer_sub_data(target, 0, buffer.data());
        }
        buffer.clear_update_needed()?;
        Ok(name)
    }
}
