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

//! Vertex attribute binding and draw call dispatch.

use super::{gl_size, BoundShader, GlRenderer};
use crate::graphics::gl::context::MAX_VERTEX_ATTRIBS;
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use glint_core::renderer::api::{
    BufferType, Caps, Location, Mesh, Mode, ModeStart, Usage, VertexBuffer, VertexFormat,
};
use glint_core::renderer::RenderError;

/// Splits a hybrid mesh into `(primitive, length)` ranges.
///
/// Ranges are triangle lists until `start.strip`, where they become strips,
/// and fans from `start.fan` on.
pub(crate) fn hybrid_ranges(lengths: &[u32], start: ModeStart) -> Vec<(u32, u32)> {
    let mut mode = gl::TRIANGLES;
    lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            if i == start.strip {
                mode = gl::TRIANGLE_STRIP;
            } else if i == start.fan {
                mode = gl::TRIANGLE_FAN;
            }
            (mode, len)
        })
        .collect()
}

fn index_type(format: VertexFormat) -> Option<u32> {
    match format {
        VertexFormat::UnsignedByte | VertexFormat::UnsignedShort | VertexFormat::UnsignedInt => {
            Some(format.into_gl())
        }
        _ => None,
    }
}

impl<D: GlDevice> GlRenderer<D> {
    fn attribute_location(&mut self, shader: &BoundShader, buffer_type: BufferType) -> Location {
        let cached = shader.attributes.borrow().get(buffer_type);
        if cached != Location::Unresolved {
            return cached;
        }
        let location = match self
            .device
            .attrib_location(shader.program, &buffer_type.attribute_name())
        {
            Some(index) => Location::At(index as i32),
            None => Location::NotDeclared,
        };
        shader.attributes.borrow_mut().set(buffer_type, location);
        location
    }

    fn bind_attribute(
        &mut self,
        shader: &BoundShader,
        buffer: &VertexBuffer,
        interleaved: Option<u32>,
    ) -> Result<(), RenderError> {
        if buffer.buffer_type() == BufferType::Index {
            return Err(RenderError::PreconditionViolation(
                "index buffers cannot be bound as vertex attributes".to_string(),
            ));
        }
        let Location::At(location) = self.attribute_location(shader, buffer.buffer_type()) else {
            return Ok(());
        };
        let location = location as u32;

        let components = buffer.components();
        let (slots, slot_components) = if components > 4 {
            if components % 4 != 0 {
                return Err(RenderError::PreconditionViolation(format!(
                    "{:?} buffer has {components} components, which is not a multiple of 4",
                    buffer.buffer_type()
                )));
            }
            (components / 4, 4)
        } else {
            (1, components)
        };
        if (location + slots) as usize > MAX_VERTEX_ATTRIBS {
            return Err(RenderError::PreconditionViolation(format!(
                "attribute {} does not fit in {MAX_VERTEX_ATTRIBS} slots",
                buffer.buffer_type().attribute_name()
            )));
        }

        let divisor = if buffer.is_instanced() {
            buffer.instance_span()
        } else {
            0
        };
        let instancing = self.caps.has(Caps::MESH_INSTANCING);
        if divisor != 0 && !instancing {
            return Err(RenderError::UnsupportedOperation(
                "instanced vertex attributes".to_string(),
            ));
        }

        // Buffers without data of their own read from the interleaved buffer.
        let (name, from_interleaved) = if buffer.data().is_empty() {
            match interleaved {
                Some(name) => (name, true),
                None => {
                    return Err(RenderError::PreconditionViolation(format!(
                        "{:?} buffer has no data and the mesh has no interleaved buffer",
                        buffer.buffer_type()
                    )))
                }
            }
        } else {
            (self.upload_buffer(buffer)?, false)
        };

        let element_size = slot_components as usize * buffer.format().size();
        let stride = if buffer.stride() == 0 && slots > 1 {
            element_size * slots as usize
        } else {
            buffer.stride() as usize
        };

        for slot_index in 0..slots {
            let index = location + slot_index;
            let slot = self.context.attribs[index as usize];
            if slot.enabled != Some(true) {
                self.device.enable_vertex_attrib_array(index);
                self.context.attribs[index as usize].enabled = Some(true);
            }
            // The pointer captures the buffer bound to ARRAY_BUFFER.
            if from_interleaved || slot.buffer != Some(name) {
                self.bind_buffer(gl::ARRAY_BUFFER, name);
                let offset = buffer.offset() as usize + slot_index as usize * element_size;
                self.device.vertex_attrib_pointer(
                    index,
                    slot_components as i32,
                    buffer.format().into_gl(),
                    buffer.is_normalized(),
                    i32::try_from(stride).unwrap_or(i32::MAX),
                    i32::try_from(offset).unwrap_or(i32::MAX),
                );
                self.context.attribs[index as usize].buffer = Some(name);
            }
            if instancing && slot.divisor != Some(divisor) {
                self.device.vertex_attrib_divisor(index, divisor);
                self.context.attribs[index as usize].divisor = Some(divisor);
            }
            self.context.active.attribs.move_to_new(index);
        }
        Ok(())
    }

    fn disable_stale_attributes(&mut self) {
        for index in self.context.active.attribs.stale() {
            let slot = &mut self.context.attribs[index as usize];
            if slot.enabled != Some(false) {
                self.device.disable_vertex_attrib_array(index);
                slot.enabled = Some(false);
            }
        }
    }

    /// Draws `mesh` with the bound program.
    pub(super) fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        lod: usize,
        instance_count: u32,
        instance_data: &[VertexBuffer],
    ) -> Result<(), RenderError> {
        let vertex_count = mesh.vertex_count();
        if vertex_count == 0 || instance_count == 0 {
            return Ok(());
        }
        if (instance_count > 1 || !instance_data.is_empty())
            && !self.caps.has(Caps::MESH_INSTANCING)
        {
            return Err(RenderError::UnsupportedOperation(
                "mesh instancing".to_string(),
            ));
        }
        let Some(shader) = self.bound_shader.clone() else {
            return Err(RenderError::PreconditionViolation(
                "no shader is bound".to_string(),
            ));
        };

        let index_buffer = if mesh.lod_levels().is_empty() {
            mesh.buffer(BufferType::Index)
        } else {
            match mesh.lod_levels().get(lod) {
                Some(level) => Some(level),
                None => {
                    return Err(RenderError::PreconditionViolation(format!(
                        "LOD {lod} is out of range, the mesh has {} levels",
                        mesh.lod_levels().len()
                    )))
                }
            }
        };
        let index_format = match index_buffer {
            Some(buffer) => match index_type(buffer.format()) {
                Some(format) => Some(format),
                None => {
                    return Err(RenderError::PreconditionViolation(format!(
                        "{:?} is not a valid index format",
                        buffer.format()
                    )))
                }
            },
            None => None,
        };

        self.ensure_vertex_array()?;
        self.apply_line_width(mesh.mode(), mesh.line_width());

        let interleaved = match mesh.buffer(BufferType::InterleavedData) {
            Some(buffer) if buffer.usage() != Usage::CpuOnly => Some(self.upload_buffer(buffer)?),
            _ => None,
        };
        for buffer in instance_data {
            if buffer.usage() != Usage::CpuOnly {
                self.bind_attribute(&shader, buffer, interleaved)?;
            }
        }
        for buffer in mesh.buffers() {
            let skipped = matches!(
                buffer.buffer_type(),
                BufferType::Index | BufferType::InterleavedData
            ) || buffer.usage() == Usage::CpuOnly;
            if !skipped {
                self.bind_attribute(&shader, buffer, interleaved)?;
            }
        }
        self.disable_stale_attributes();

        let instances = (instance_count > 1).then(|| gl_size(instance_count));
        match (index_buffer, index_format) {
            (Some(buffer), Some(index_format)) => {
                let name = self.upload_buffer(buffer)?;
                self.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, name);
                if mesh.mode() == Mode::Hybrid {
                    let index_size = buffer.format().size();
                    let mut offset = 0usize;
                    for (mode, len) in hybrid_ranges(mesh.element_lengths(), mesh.mode_start()) {
                        self.draw_elements(mode, len as usize, index_format, offset, instances);
                        offset += len as usize * index_size;
                    }
                } else {
                    let count = buffer.element_count() * buffer.components().max(1) as usize;
                    self.draw_elements(mesh.mode().into_gl(), count, index_format, 0, instances);
                }
            }
            _ => {
                if mesh.mode() == Mode::Hybrid {
                    let mut first = 0usize;
                    for (mode, len) in hybrid_ranges(mesh.element_lengths(), mesh.mode_start()) {
                        self.draw_arrays(mode, first, len as usize, instances);
                        first += len as usize;
                    }
                } else {
                    self.draw_arrays(mesh.mode().into_gl(), 0, vertex_count, instances);
                }
            }
        }

        self.stats.on_mesh_drawn(vertex_count, instance_count);
        self.context.active.attribs.finish();
        self.context.active.texture_units.finish();
        Ok(())
    }

    fn draw_elements(
        &mut self,
        mode: u32,
        count: usize,
        index_type: u32,
        offset: usize,
        instances: Option<i32>,
    ) {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        let offset = i32::try_from(offset).unwrap_or(i32::MAX);
        match instances {
            Some(instances) => self
                .device
                .draw_elements_instanced(mode, count, index_type, offset, instances),
            None => self.device.draw_elements(mode, count, index_type, offset),
        }
        self.stats.on_draw_call();
    }

    fn draw_arrays(&mut self, mode: u32, first: usize, count: usize, instances: Option<i32>) {
        let first = i32::try_from(first).unwrap_or(i32::MAX);
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        match instances {
            Some(instances) => self
                .device
                .draw_arrays_instanced(mode, first, count, instances),
            None => self.device.draw_arrays(mode, first, count),
        }
        self.stats.on_draw_call();
    }
}
