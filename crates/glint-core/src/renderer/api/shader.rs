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

//! Defines shader sources, programs and their uniform and attribute bookkeeping.
//!
//! A [`Shader`] is an ordered set of [`ShaderSource`]s linked into one program.
//! Each source has its own native shader object; the program has a separate
//! native handle. Uniform and attribute locations are resolved lazily by the
//! backend and cached here until the next re-link.

use super::buffer::BufferType;
use super::object::{GpuObject, NativeKind};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The pipeline stage a source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
    /// Geometry stage.
    Geometry,
    /// Tessellation control stage.
    TessellationControl,
    /// Tessellation evaluation stage.
    TessellationEvaluation,
}

/// One shader source, compiled once into a native shader object.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    name: String,
    language: String,
    defines: String,
    source: String,
    object: GpuObject,
}

impl ShaderSource {
    /// Creates a source. `language` names the shading language tier, e.g. `"GLSL150"`.
    pub fn new(
        stage: ShaderStage,
        name: impl Into<String>,
        language: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            name: name.into(),
            language: language.into(),
            defines: String::new(),
            source: source.into(),
            object: GpuObject::new(NativeKind::ShaderSource),
        }
    }

    /// Sets the preprocessor defines prepended to the body.
    #[must_use]
    pub fn with_defines(mut self, defines: impl Into<String>) -> Self {
        self.defines = defines.into();
        self
    }

    /// Replaces the body. A compiled source rejects this at the next use.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.object.set_update_needed();
    }

    /// The numeric GLSL version of the language tier (`"GLSL150"` gives 150).
    ///
    /// Returns `None` for languages that are not a GLSL tier.
    pub fn glsl_version(&self) -> Option<u32> {
        self.language
            .strip_prefix("GLSL")
            .and_then(|v| v.parse().ok())
    }

    /// The stage.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The language tier.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The defines block.
    pub fn defines(&self) -> &str {
        &self.defines
    }

    /// The body.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The GPU bookkeeping of this source.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

/// A value that can be uploaded to a uniform.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 3x3 matrix.
    Mat3([f32; 9]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
    FloatArray(Vec<f32>),
    Vec4Array(Vec<[f32; 4]>),
}

/// The resolution state of a uniform or attribute location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// Not looked up since the last link.
    #[default]
    Unresolved,
    /// Looked up, but the program does not declare it.
    NotDeclared,
    /// Resolved to a native location.
    At(i32),
}

/// A named uniform with its cached location.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    /// The name declared in the source.
    pub name: String,
    /// The value to upload, `None` until set.
    pub value: Option<UniformValue>,
    /// The cached location.
    pub location: Location,
    /// Set when the value changed since the last upload.
    pub update_needed: bool,
}

impl Uniform {
    fn new(name: String) -> Self {
        Self {
            name,
            value: None,
            location: Location::Unresolved,
            update_needed: true,
        }
    }
}

/// Cached attribute locations, keyed by buffer role.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    locations: HashMap<BufferType, Location>,
}

impl AttributeTable {
    /// The cached location, `Unresolved` when never looked up.
    pub fn get(&self, buffer_type: BufferType) -> Location {
        self.locations
            .get(&buffer_type)
            .copied()
            .unwrap_or_default()
    }

    /// Caches a location.
    pub fn set(&mut self, buffer_type: BufferType, location: Location) {
        self.locations.insert(buffer_type, location);
    }

    /// Forgets every cached location.
    pub fn clear(&mut self) {
        self.locations.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// A shader program: its sources, uniforms and attribute locations.
#[derive(Debug)]
pub struct Shader {
    sources: Vec<ShaderSource>,
    uniforms: HashMap<String, Uniform>,
    attributes: Rc<RefCell<AttributeTable>>,
    object: GpuObject,
}

impl Default for Shader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader {
    /// Creates a program without sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            uniforms: HashMap::new(),
            attributes: Rc::new(RefCell::new(AttributeTable::default())),
            object: GpuObject::new(NativeKind::Program),
        }
    }

    /// Appends a source and marks the program for (re)linking.
    pub fn add_source(&mut self, source: ShaderSource) {
        self.sources.push(source);
        self.object.set_update_needed();
    }

    /// Builder form of [`Shader::add_source`].
    #[must_use]
    pub fn with_source(mut self, source: ShaderSource) -> Self {
        self.add_source(source);
        self
    }

    /// Removes every source and marks the program for relinking.
    pub fn clear_sources(&mut self) -> Vec<ShaderSource> {
        self.object.set_update_needed();
        std::mem::take(&mut self.sources)
    }

    /// Sets a uniform value. The value is uploaded at the next bind only if it changed.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let uniform = self
            .uniforms
            .entry(name.to_owned())
            .or_insert_with(|| Uniform::new(name.to_owned()));
        if uniform.value.as_ref() != Some(&value) {
            uniform.value = Some(value);
            uniform.update_needed = true;
        }
    }

    /// Looks up a uniform.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// Removes a uniform.
    pub fn remove_uniform(&mut self, name: &str) -> Option<Uniform> {
        self.uniforms.remove(name)
    }

    /// Iterates over every uniform.
    pub fn uniforms(&self) -> impl Iterator<Item = &Uniform> {
        self.uniforms.values()
    }

    /// Iterates mutably over every uniform.
    pub fn uniforms_mut(&mut self) -> impl Iterator<Item = &mut Uniform> {
        self.uniforms.values_mut()
    }

    /// Forgets every cached location, forcing all values to be re-uploaded.
    ///
    /// Called after each link since locations do not survive a re-link.
    pub fn reset_locations(&mut self) {
        for uniform in self.uniforms.values_mut() {
            uniform.location = Location::Unresolved;
            uniform.update_needed = true;
        }
        self.attributes.borrow_mut().clear();
    }

    /// The sources, in attachment order.
    pub fn sources(&self) -> &[ShaderSource] {
        &self.sources
    }

    /// The shared attribute location table.
    pub fn attributes(&self) -> &Rc<RefCell<AttributeTable>> {
        &self.attributes
    }

    /// The GPU bookkeeping of the program.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glsl_version_parsing() {
        let src = ShaderSource::new(ShaderStage::Vertex, "a.vert", "GLSL150", "void main(){}");
        assert_eq!(src.glsl_version(), Some(150));
        let src = ShaderSource::new(ShaderStage::Vertex, "a.vert", "HLSL", "");
        assert_eq!(src.glsl_version(), None);
    }

    #[test]
    fn uniform_upload_only_on_change() {
        let mut shader = Shader::new();
        shader.set_uniform("m_Color", UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]));
        for u in shader.uniforms_mut() {
            u.update_needed = false;
        }
        shader.set_uniform("m_Color", UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]));
        assert!(!shader.uniform("m_Color").unwrap().update_needed);
        shader.set_uniform("m_Color", UniformValue::Vec4([0.0, 1.0, 0.0, 1.0]));
        assert!(shader.uniform("m_Color").unwrap().update_needed);
    }

    #[test]
    fn reset_locations_clears_caches() {
        let mut shader = Shader::new();
        shader.set_uniform("g_Time", UniformValue::Float(1.0));
        for u in shader.uniforms_mut() {
            u.location = Location::At(3);
            u.update_needed = false;
        }
        shader
            .attributes()
            .borrow_mut()
            .set(BufferType::Position, Location::At(0));

        shader.reset_locations();
        let uniform = shader.uniform("g_Time").unwrap();
        assert_eq!(uniform.location, Location::Unresolved);
        assert!(uniform.update_needed);
        assert!(shader.attributes().borrow().is_empty());
        assert_eq!(
            shader.attributes().borrow().get(BufferType::Position),
            Location::Unresolved
        );
    }

    #[test]
    fn adding_sources_dirties_the_program() {
        let shader = Shader::new()
            .with_source(ShaderSource::new(ShaderStage::Vertex, "v", "GLSL150", ""))
            .with_source(ShaderSource::new(ShaderStage::Fragment, "f", "GLSL150", ""));
        assert_eq!(shader.sources().len(), 2);
        assert!(shader.object().is_update_needed());
    }
}
