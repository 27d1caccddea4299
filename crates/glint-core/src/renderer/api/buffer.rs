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

//! Defines data structures related to vertex and index buffers.

use super::object::{GpuObject, NativeKind};
use crate::renderer::error::RenderError;
use std::cell::Cell;

/// The semantic role of a vertex buffer inside a mesh.
///
/// Each non-index role is bound to the shader attribute named `in<Role>`,
/// e.g. [`BufferType::Position`] feeds `inPosition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferType {
    /// Vertex positions.
    Position,
    /// Point sprite sizes.
    Size,
    /// Vertex normals.
    Normal,
    /// First texture coordinate set.
    TexCoord,
    /// Vertex colours.
    Color,
    /// Tangent vectors.
    Tangent,
    /// Binormal vectors.
    Binormal,
    /// Index data. Never bound as an attribute.
    Index,
    /// A container of interleaved data. Never bound directly.
    InterleavedData,
    /// Skinning weights.
    BoneWeight,
    /// Skinning bone indices.
    BoneIndex,
    /// Second texture coordinate set.
    TexCoord2,
    /// Third texture coordinate set.
    TexCoord3,
    /// Fourth texture coordinate set.
    TexCoord4,
    /// Per-instance data, usually a transform matrix.
    InstanceData,
}

impl BufferType {
    /// The name of the shader attribute this buffer feeds.
    pub fn attribute_name(self) -> String {
        format!("in{self:?}")
    }
}

/// How often the content of a buffer is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    /// Uploaded once, drawn many times.
    Static,
    /// Updated occasionally.
    Dynamic,
    /// Updated every frame.
    Stream,
    /// Kept on the CPU only and never uploaded.
    CpuOnly,
}

/// The scalar type of a single vertex component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit integer.
    UnsignedByte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UnsignedShort,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UnsignedInt,
    /// 16-bit float.
    Half,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl VertexFormat {
    /// Size of one component in bytes.
    pub const fn size(self) -> usize {
        match self {
            VertexFormat::Byte | VertexFormat::UnsignedByte => 1,
            VertexFormat::Short | VertexFormat::UnsignedShort | VertexFormat::Half => 2,
            VertexFormat::Int | VertexFormat::UnsignedInt | VertexFormat::Float => 4,
            VertexFormat::Double => 8,
        }
    }
}

/// A typed CPU-side array of vertex or index data, mirrored by a GPU buffer object.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    buffer_type: BufferType,
    usage: Usage,
    format: VertexFormat,
    components: u32,
    normalized: bool,
    stride: u32,
    offset: u32,
    instance_span: u32,
    data: Vec<u8>,
    data_size_changed: Cell<bool>,
    object: GpuObject,
}

impl VertexBuffer {
    /// Creates a buffer of the given role holding `data`.
    ///
    /// `data` must contain whole elements of `components` values of type `format`.
    pub fn new(
        buffer_type: BufferType,
        usage: Usage,
        components: u32,
        format: VertexFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            buffer_type,
            usage,
            format,
            components,
            normalized: false,
            stride: 0,
            offset: 0,
            instance_span: 0,
            data,
            data_size_changed: Cell::new(true),
            object: GpuObject::new(NativeKind::Buffer),
        }
    }

    /// Creates a buffer from any plain-old-data slice.
    pub fn from_slice<T: bytemuck::Pod>(
        buffer_type: BufferType,
        usage: Usage,
        components: u32,
        format: VertexFormat,
        values: &[T],
    ) -> Self {
        Self::new(
            buffer_type,
            usage,
            components,
            format,
            bytemuck::cast_slice(values).to_vec(),
        )
    }

    /// Marks integer data as normalized to `[0, 1]` (or `[-1, 1]`) when read by a shader.
    #[must_use]
    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Sets the stride and offset for data read from an interleaved layout.
    #[must_use]
    pub fn with_layout(mut self, stride: u32, offset: u32) -> Self {
        self.stride = stride;
        self.offset = offset;
        self
    }

    /// Makes the buffer per-instance: one element is used for every `span` instances.
    #[must_use]
    pub fn with_instance_span(mut self, span: u32) -> Self {
        self.instance_span = span;
        self
    }

    /// Replaces the content of the buffer and marks it for upload.
    pub fn update_data(&mut self, data: Vec<u8>) {
        if data.len() != self.data.len() {
            self.data_size_changed.set(true);
        }
        self.data = data;
        self.object.set_update_needed();
    }

    /// Replaces the content of the buffer from a plain-old-data slice.
    pub fn update_data_from<T: bytemuck::Pod>(&mut self, values: &[T]) {
        self.update_data(bytemuck::cast_slice(values).to_vec());
    }

    /// Changes the usage hint. A full re-specification happens at the next upload.
    pub fn set_usage(&mut self, usage: Usage) {
        self.usage = usage;
        self.data_size_changed.set(true);
        self.object.set_update_needed();
    }

    /// Clears the dirty markers after a successful upload.
    pub fn clear_update_needed(&self) -> Result<(), RenderError> {
        self.object.clear_update_needed()?;
        self.data_size_changed.set(false);
        Ok(())
    }

    /// Returns `true` if the byte size changed since the last upload.
    pub fn has_data_size_changed(&self) -> bool {
        self.data_size_changed.get()
    }

    /// The number of whole elements stored.
    pub fn element_count(&self) -> usize {
        let element_size = self.components as usize * self.format.size();
        if element_size == 0 {
            0
        } else {
            self.data.len() / element_size
        }
    }

    /// The role of the buffer.
    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    /// The usage hint.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// The scalar component type.
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// Components per element.
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Returns `true` if integer data is normalized when read.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Byte stride between elements, 0 for tightly packed data.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset of the first element.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Instances sharing one element, 0 for per-vertex data.
    pub fn instance_span(&self) -> u32 {
        self.instance_span
    }

    /// Returns `true` if the buffer carries per-instance data.
    pub fn is_instanced(&self) -> bool {
        self.instance_span > 0
    }

    /// The raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The GPU bookkeeping of this buffer.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::object::NativeHandle;

    fn positions() -> VertexBuffer {
        VertexBuffer::from_slice(
            BufferType::Position,
            Usage::Static,
            3,
            VertexFormat::Float,
            &[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        )
    }

    #[test]
    fn attribute_names_follow_the_role() {
        assert_eq!(BufferType::Position.attribute_name(), "inPosition");
        assert_eq!(BufferType::TexCoord2.attribute_name(), "inTexCoord2");
        assert_eq!(BufferType::InstanceData.attribute_name(), "inInstanceData");
    }

    #[test]
    fn element_count_uses_component_size() {
        let vb = positions();
        assert_eq!(vb.data().len(), 36);
        assert_eq!(vb.element_count(), 3);
        let idx = VertexBuffer::from_slice(
            BufferType::Index,
            Usage::Static,
            1,
            VertexFormat::UnsignedShort,
            &[0u16, 1, 2],
        );
        assert_eq!(idx.element_count(), 3);
    }

    #[test]
    fn size_change_tracking() {
        let mut vb = positions();
        assert!(vb.has_data_size_changed());
        vb.object().set_handle(NativeHandle(1));
        vb.clear_update_needed().unwrap();
        assert!(!vb.has_data_size_changed());
        assert!(!vb.object().is_update_needed());

        vb.update_data_from(&[1.0f32; 9]);
        assert!(vb.object().is_update_needed());
        assert!(!vb.has_data_size_changed());

        vb.update_data_from(&[1.0f32; 12]);
        assert!(vb.has_data_size_changed());
    }

    #[test]
    fn clearing_unallocated_buffer_fails() {
        let vb = positions();
        assert!(vb.clear_update_needed().is_err());
        assert!(vb.has_data_size_changed());
    }
}
