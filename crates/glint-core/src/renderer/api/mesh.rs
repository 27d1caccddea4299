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

//! Defines drawable geometry.

use super::buffer::{BufferType, VertexBuffer};
use std::collections::BTreeMap;

/// Primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Each vertex is a point.
    Points,
    /// Each pair of vertices is a line.
    Lines,
    /// A closed line strip.
    LineLoop,
    /// A connected line strip.
    LineStrip,
    /// Each triple of vertices is a triangle.
    #[default]
    Triangles,
    /// A triangle strip.
    TriangleStrip,
    /// A triangle fan.
    TriangleFan,
    /// A sequence of triangle lists, strips and fans, see [`ModeStart`].
    Hybrid,
}

/// Where each sub-topology starts in a hybrid mesh.
///
/// Ranges are drawn as triangle lists until range `strip`, as strips until
/// range `fan` and as fans afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeStart {
    /// First range drawn as a triangle list.
    pub list: usize,
    /// First range drawn as a triangle strip.
    pub strip: usize,
    /// First range drawn as a triangle fan.
    pub fan: usize,
}

/// A set of vertex buffers drawn with one topology.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    mode: Mode,
    buffers: BTreeMap<BufferType, VertexBuffer>,
    lod_levels: Vec<VertexBuffer>,
    element_lengths: Vec<u32>,
    mode_start: ModeStart,
    line_width: f32,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            line_width: 1.0,
            ..Default::default()
        }
    }

    /// Inserts or replaces the buffer for its role.
    pub fn set_buffer(&mut self, buffer: VertexBuffer) {
        self.buffers.insert(buffer.buffer_type(), buffer);
    }

    /// Builder form of [`Mesh::set_buffer`].
    #[must_use]
    pub fn with_buffer(mut self, buffer: VertexBuffer) -> Self {
        self.set_buffer(buffer);
        self
    }

    /// Removes the buffer for a role.
    pub fn remove_buffer(&mut self, buffer_type: BufferType) -> Option<VertexBuffer> {
        self.buffers.remove(&buffer_type)
    }

    /// The buffer for a role.
    pub fn buffer(&self, buffer_type: BufferType) -> Option<&VertexBuffer> {
        self.buffers.get(&buffer_type)
    }

    /// The mutable buffer for a role.
    pub fn buffer_mut(&mut self, buffer_type: BufferType) -> Option<&mut VertexBuffer> {
        self.buffers.get_mut(&buffer_type)
    }

    /// Every buffer, ordered by role.
    pub fn buffers(&self) -> impl Iterator<Item = &VertexBuffer> {
        self.buffers.values()
    }

    /// Sets the index buffers of the levels of detail, most detailed first.
    pub fn set_lod_levels(&mut self, levels: Vec<VertexBuffer>) {
        self.lod_levels = levels;
    }

    /// The level-of-detail index buffers.
    pub fn lod_levels(&self) -> &[VertexBuffer] {
        &self.lod_levels
    }

    /// Switches to hybrid topology with the given range lengths.
    pub fn set_hybrid(&mut self, element_lengths: Vec<u32>, mode_start: ModeStart) {
        self.mode = Mode::Hybrid;
        self.element_lengths = element_lengths;
        self.mode_start = mode_start;
    }

    /// Changes the topology.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Sets the rasterized line width.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// The topology.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The length of each hybrid range.
    pub fn element_lengths(&self) -> &[u32] {
        &self.element_lengths
    }

    /// The hybrid sub-topology starts.
    pub fn mode_start(&self) -> ModeStart {
        self.mode_start
    }

    /// The line width.
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// The number of vertices, taken from the position buffer.
    ///
    /// A position buffer without data of its own reads from the interleaved
    /// buffer, so the count comes from the interleaved size and its stride.
    pub fn vertex_count(&self) -> usize {
        let Some(position) = self.buffer(BufferType::Position) else {
            return 0;
        };
        if !position.data().is_empty() || position.stride() == 0 {
            return position.element_count();
        }
        self.buffer(BufferType::InterleavedData)
            .map_or(0, |interleaved| {
                interleaved.data().len() / position.stride() as usize
            })
    }
}
