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

//! A headless device that simulates a GL driver and records every call.
//!
//! Queries answer from a configurable table, object names are allocated from a
//! counter, shader sources containing `#error` fail to compile and programs
//! fail to link while [`RecordingDevice::fail_links`] is set. Everything else
//! is only recorded as a [`GlCall`].

use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use glint_core::renderer::api::UniformValue;
use std::collections::{HashMap, HashSet};

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GlCall {
    Enable(u32),
    Disable(u32),
    PolygonMode(u32, u32),
    DepthFunc(u32),
    DepthMask(bool),
    ColorMask(bool, bool, bool, bool),
    PolygonOffset(f32, f32),
    CullFace(u32),
    BlendFunc(u32, u32),
    StencilOpSeparate(u32, u32, u32, u32),
    StencilFuncSeparate(u32, u32, i32, u32),
    Scissor(i32, i32, i32, i32),
    Viewport(i32, i32, i32, i32),
    ClearColor(f32, f32, f32, f32),
    Clear(u32),
    DepthRange(f32, f32),
    LineWidth(f32),

    CreateBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer(u32, Option<u32>),
    BufferData { target: u32, size: usize, usage: u32 },
    BufferSubData { target: u32, offset: i32, size: usize },
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    VertexAttribDivisor(u32, u32),

    CreateShader { stage: u32, name: u32 },
    ShaderSource(u32, String),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    BindFragDataLocation(u32, u32, String),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    GetUniformLocation(u32, String),
    GetAttribLocation(u32, String),
    Uniform(i32, UniformValue),

    CreateTexture(u32),
    DeleteTexture(u32),
    ActiveTexture(u32),
    BindTexture(u32, Option<u32>),
    TexParameterI(u32, u32, i32),
    TexParameterF(u32, u32, f32),
    PixelStore(u32, i32),
    TexImage2D {
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        has_data: bool,
    },
    TexImage3D {
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        data_type: u32,
        has_data: bool,
    },
    CompressedTexImage2D {
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        size: usize,
    },
    CompressedTexImage3D {
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        size: usize,
    },
    TexImage2DMultisample {
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    },
    TexSubImage2D {
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
    },
    TexSubImage3D {
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        z: i32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        data_type: u32,
    },
    GenerateMipmap(u32),

    CreateFramebuffer(u32),
    DeleteFramebuffer(u32),
    BindFramebuffer(u32, Option<u32>),
    CreateRenderbuffer(u32),
    DeleteRenderbuffer(u32),
    BindRenderbuffer(Option<u32>),
    RenderbufferStorage {
        internal_format: u32,
        width: i32,
        height: i32,
    },
    RenderbufferStorageMultisample {
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    },
    FramebufferRenderbuffer {
        target: u32,
        attachment: u32,
        renderbuffer: Option<u32>,
    },
    FramebufferTexture2D {
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<u32>,
        level: i32,
    },
    FramebufferTextureLayer {
        target: u32,
        attachment: u32,
        texture: Option<u32>,
        level: i32,
        layer: i32,
    },
    CheckFramebufferStatus(u32),
    DrawBuffer(u32),
    DrawBuffers(Vec<u32>),
    ReadBuffer(u32),
    BlitFramebuffer {
        src: [i32; 4],
        dst: [i32; 4],
        mask: u32,
        filter: u32,
    },
    ReadPixels {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
    },

    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    DrawArraysInstanced {
        mode: u32,
        first: i32,
        count: i32,
        instances: i32,
    },
    DrawElements {
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
    },
    DrawElementsInstanced {
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
        instances: i32,
    },
}

impl GlCall {
    /// Returns `true` for calls that change fixed-function state.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            GlCall::Enable(_)
                | GlCall::Disable(_)
                | GlCall::PolygonMode(..)
                | GlCall::DepthFunc(_)
                | GlCall::DepthMask(_)
                | GlCall::ColorMask(..)
                | GlCall::PolygonOffset(..)
                | GlCall::CullFace(_)
                | GlCall::BlendFunc(..)
                | GlCall::StencilOpSeparate(..)
                | GlCall::StencilFuncSeparate(..)
                | GlCall::Scissor(..)
                | GlCall::Viewport(..)
                | GlCall::ClearColor(..)
                | GlCall::DepthRange(..)
                | GlCall::LineWidth(_)
        )
    }

    /// Returns `true` for draw calls.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GlCall::DrawArrays { .. }
                | GlCall::DrawArraysInstanced { .. }
                | GlCall::DrawElements { .. }
                | GlCall::DrawElementsInstanced { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NameKind {
    Buffer,
    VertexArray,
    Shader,
    Program,
    Texture,
    Framebuffer,
    Renderbuffer,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<u32>,
    linked: bool,
    generation: i32,
    uniforms: HashMap<String, i32>,
    attributes: HashMap<String, u32>,
}

/// A simulated GL device.
#[derive(Debug)]
pub struct RecordingDevice {
    strings: HashMap<u32, String>,
    integers: HashMap<u32, i32>,
    floats: HashMap<u32, f32>,
    extensions: HashSet<String>,
    enabled: HashSet<u32>,
    calls: Vec<GlCall>,
    next_name: u32,
    live: HashSet<(NameKind, u32)>,
    double_deletes: usize,
    sources: HashMap<u32, String>,
    compiled: HashMap<u32, bool>,
    programs: HashMap<u32, ProgramState>,
    /// Makes every following link fail.
    pub fail_links: bool,
    /// The status returned by `check_framebuffer_status`.
    pub framebuffer_status: u32,
    /// The byte written into every pixel read back.
    pub pixel_fill: u8,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A device reporting an OpenGL 3.3 core profile context with S3TC and
    /// anisotropic filtering.
    pub fn new() -> Self {
        let mut device = Self {
            strings: HashMap::new(),
            integers: HashMap::new(),
            floats: HashMap::new(),
            extensions: HashSet::new(),
            enabled: HashSet::new(),
            calls: Vec::new(),
            next_name: 1,
            live: HashSet::new(),
            double_deletes: 0,
            sources: HashMap::new(),
            compiled: HashMap::new(),
            programs: HashMap::new(),
            fail_links: false,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            pixel_fill: 0x7F,
        };
        device
            .set_string(gl::VENDOR, "glint")
            .set_string(gl::RENDERER, "RecordingDevice")
            .set_string(gl::VERSION, "3.3.0 Recording")
            .set_string(gl::SHADING_LANGUAGE_VERSION, "3.30 Recording")
            .set_integer(gl::CONTEXT_PROFILE_MASK, gl::CONTEXT_CORE_PROFILE_BIT)
            .set_integer(gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS, 16)
            .set_integer(gl::MAX_TEXTURE_IMAGE_UNITS, 16)
            .set_integer(gl::MAX_VERTEX_UNIFORM_COMPONENTS, 4096)
            .set_integer(gl::MAX_FRAGMENT_UNIFORM_COMPONENTS, 4096)
            .set_integer(gl::MAX_VERTEX_ATTRIBS, 16)
            .set_integer(gl::MAX_TEXTURE_SIZE, 4096)
            .set_integer(gl::MAX_CUBE_MAP_TEXTURE_SIZE, 2048)
            .set_integer(gl::MAX_RENDERBUFFER_SIZE, 4096)
            .set_integer(gl::MAX_COLOR_ATTACHMENTS, 8)
            .set_integer(gl::MAX_DRAW_BUFFERS, 8)
            .set_integer(gl::MAX_SAMPLES, 8)
            .set_integer(gl::MAX_COLOR_TEXTURE_SAMPLES, 8)
            .set_integer(gl::MAX_DEPTH_TEXTURE_SAMPLES, 8)
            .set_integer(gl::SAMPLES, 0)
            .set_integer(gl::DRAW_BUFFER, gl::BACK as i32)
            .set_integer(gl::READ_BUFFER, gl::BACK as i32)
            .set_float(gl::MAX_TEXTURE_MAX_ANISOTROPY, 16.0)
            .add_extension("GL_EXT_texture_compression_s3tc")
            .add_extension("GL_EXT_texture_filter_anisotropic");
        device
    }

    /// A bare OpenGL 2.1 device without extensions or framebuffer objects.
    pub fn gl21() -> Self {
        let mut device = Self::new();
        device.extensions.clear();
        device
            .set_string(gl::VERSION, "2.1 Recording")
            .set_string(gl::SHADING_LANGUAGE_VERSION, "1.20")
            .set_integer(gl::CONTEXT_PROFILE_MASK, 0)
            .set_integer(gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS, 0)
            .set_integer(gl::MAX_TEXTURE_SIZE, 2048)
            .set_integer(gl::MAX_CUBE_MAP_TEXTURE_SIZE, 1024);
        device
    }

    /// Sets the answer to a string query.
    pub fn set_string(&mut self, name: u32, value: &str) -> &mut Self {
        self.strings.insert(name, value.to_owned());
        self
    }

    /// Sets the answer to an integer query.
    pub fn set_integer(&mut self, pname: u32, value: i32) -> &mut Self {
        self.integers.insert(pname, value);
        self
    }

    /// Sets the answer to a float query.
    pub fn set_float(&mut self, pname: u32, value: f32) -> &mut Self {
        self.floats.insert(pname, value);
        self
    }

    /// Advertises an extension.
    pub fn add_extension(&mut self, name: &str) -> &mut Self {
        self.extensions.insert(name.to_owned());
        self
    }

    /// Stops advertising an extension.
    pub fn remove_extension(&mut self, name: &str) -> &mut Self {
        self.extensions.remove(name);
        self
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns and forgets every call recorded so far.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forgets every call recorded so far.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Counts the recorded calls matching a predicate.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// The number of native objects currently alive, vertex arrays excluded.
    pub fn live_objects(&self) -> usize {
        self.live
            .iter()
            .filter(|(kind, _)| *kind != NameKind::VertexArray)
            .count()
    }

    /// The number of deletions of names that were not alive.
    pub fn double_deletes(&self) -> usize {
        self.double_deletes
    }

    /// Returns `true` if the program linked successfully.
    pub fn is_program_linked(&self, program: u32) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    fn allocate(&mut self, kind: NameKind) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        self.live.insert((kind, name));
        name
    }

    fn release(&mut self, kind: NameKind, name: u32) {
        if !self.live.remove(&(kind, name)) {
            self.double_deletes += 1;
        }
    }

    fn program_mentions(&self, program: u32, identifier: &str) -> bool {
        self.programs.get(&program).is_some_and(|state| {
            state.attached.iter().any(|shader| {
                self.sources
                    .get(shader)
                    .is_some_and(|source| source.contains(identifier))
            })
        })
    }
}

impl GlDevice for RecordingDevice {
    fn get_string(&mut self, name: u32) -> String {
        self.strings.get(&name).cloned().unwrap_or_default()
    }

    fn get_integer(&mut self, pname: u32) -> i32 {
        self.integers.get(&pname).copied().unwrap_or(0)
    }

    fn get_float(&mut self, pname: u32) -> f32 {
        self.floats.get(&pname).copied().unwrap_or(0.0)
    }

    fn extensions(&mut self) -> HashSet<String> {
        self.extensions.clone()
    }

    fn is_enabled(&mut self, cap: u32) -> bool {
        self.enabled.contains(&cap)
    }

    fn enable(&mut self, cap: u32) {
        self.enabled.insert(cap);
        self.record(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: u32) {
        self.enabled.remove(&cap);
        self.record(GlCall::Disable(cap));
    }

    fn polygon_mode(&mut self, face: u32, mode: u32) {
        self.record(GlCall::PolygonMode(face, mode));
    }

    fn depth_func(&mut self, func: u32) {
        self.record(GlCall::DepthFunc(func));
    }

    fn depth_mask(&mut self, enabled: bool) {
        self.record(GlCall::DepthMask(enabled));
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.record(GlCall::ColorMask(red, green, blue, alpha));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.record(GlCall::PolygonOffset(factor, units));
    }

    fn cull_face(&mut self, face: u32) {
        self.record(GlCall::CullFace(face));
    }

    fn blend_func(&mut self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, depth_pass: u32) {
        self.record(GlCall::StencilOpSeparate(face, fail, depth_fail, depth_pass));
    }

    fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32) {
        self.record(GlCall::StencilFuncSeparate(face, func, reference, mask));
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor(x, y, width, height));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::ClearColor(red, green, blue, alpha));
    }

    fn clear(&mut self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        self.record(GlCall::DepthRange(near, far));
    }

    fn line_width(&mut self, width: f32) {
        self.record(GlCall::LineWidth(width));
    }

    fn create_buffer(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::Buffer);
        self.record(GlCall::CreateBuffer(name));
        Ok(name)
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.release(NameKind::Buffer, buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: u32, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32) {
        self.record(GlCall::BufferData {
            target,
            size: data.len(),
            usage,
        });
    }

    fn buffer_sub_data(&mut self, target: u32, offset: i32, data: &[u8]) {
        self.record(GlCall::BufferSubData {
            target,
            offset,
            size: data.len(),
        });
    }

    fn create_vertex_array(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::VertexArray);
        self.record(GlCall::CreateVertexArray(name));
        Ok(name)
    }

    fn bind_vertex_array(&mut self, vao: Option<u32>) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&mut self, vao: u32) {
        self.release(NameKind::VertexArray, vao);
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
        self.record(GlCall::VertexAttribDivisor(index, divisor));
    }

    fn create_shader(&mut self, stage: u32) -> Result<u32, String> {
        let name = self.allocate(NameKind::Shader);
        self.record(GlCall::CreateShader { stage, name });
        Ok(name)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        self.sources.insert(shader, source.to_owned());
        self.record(GlCall::ShaderSource(shader, source.to_owned()));
    }

    fn compile_shader(&mut self, shader: u32) {
        let ok = self
            .sources
            .get(&shader)
            .is_some_and(|source| !source.contains("#error"));
        self.compiled.insert(shader, ok);
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&mut self, shader: u32) -> bool {
        self.compiled.get(&shader).copied().unwrap_or(false)
    }

    fn shader_info_log(&mut self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: #error directive encountered".to_owned()
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.release(NameKind::Shader, shader);
        self.sources.remove(&shader);
        self.compiled.remove(&shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::Program);
        self.programs.insert(name, ProgramState::default());
        self.record(GlCall::CreateProgram(name));
        Ok(name)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(state) = self.programs.get_mut(&program) {
            state.attached.push(shader);
        }
        self.record(GlCall::AttachShader(program, shader));
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        if let Some(state) = self.programs.get_mut(&program) {
            state.attached.retain(|attached| *attached != shader);
        }
        self.record(GlCall::DetachShader(program, shader));
    }

    fn bind_frag_data_location(&mut self, program: u32, color: u32, name: &str) {
        self.record(GlCall::BindFragDataLocation(program, color, name.to_owned()));
    }

    fn link_program(&mut self, program: u32) {
        let all_compiled = self.programs.get(&program).is_some_and(|state| {
            !state.attached.is_empty()
                && state
                    .attached
                    .iter()
                    .all(|shader| self.compiled.get(shader).copied().unwrap_or(false))
        });
        let fail = self.fail_links;
        if let Some(state) = self.programs.get_mut(&program) {
            state.linked = all_compiled && !fail;
            state.generation += 1;
            state.uniforms.clear();
            state.attributes.clear();
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&mut self, program: u32) -> bool {
        self.is_program_linked(program)
    }

    fn program_info_log(&mut self, program: u32) -> String {
        if self.is_program_linked(program) {
            String::new()
        } else {
            "error: linking failed".to_owned()
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.release(NameKind::Program, program);
        self.programs.remove(&program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.record(GlCall::GetUniformLocation(program, name.to_owned()));
        if !self.program_mentions(program, name) {
            return None;
        }
        let state = self.programs.get_mut(&program)?;
        if !state.linked {
            return None;
        }
        let next = state.generation * 100 + state.uniforms.len() as i32;
        Some(*state.uniforms.entry(name.to_owned()).or_insert(next))
    }

    fn attrib_location(&mut self, program: u32, name: &str) -> Option<u32> {
        self.record(GlCall::GetAttribLocation(program, name.to_owned()));
        if !self.program_mentions(program, name) {
            return None;
        }
        let state = self.programs.get_mut(&program)?;
        if !state.linked {
            return None;
        }
        let next = state.attributes.len() as u32;
        Some(*state.attributes.entry(name.to_owned()).or_insert(next))
    }

    fn set_uniform(&mut self, location: i32, value: &UniformValue) {
        self.record(GlCall::Uniform(location, value.clone()));
    }

    fn create_texture(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::Texture);
        self.record(GlCall::CreateTexture(name));
        Ok(name)
    }

    fn delete_texture(&mut self, texture: u32) {
        self.release(NameKind::Texture, texture);
        self.record(GlCall::DeleteTexture(texture));
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, target: u32, texture: Option<u32>) {
        self.record(GlCall::BindTexture(target, texture));
    }

    fn tex_parameter_i32(&mut self, target: u32, pname: u32, value: i32) {
        self.record(GlCall::TexParameterI(target, pname, value));
    }

    fn tex_parameter_f32(&mut self, target: u32, pname: u32, value: f32) {
        self.record(GlCall::TexParameterF(target, pname, value));
    }

    fn pixel_store_i32(&mut self, pname: u32, value: i32) {
        self.record(GlCall::PixelStore(pname, value));
    }

    fn tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            target,
            level,
            internal_format,
            width,
            height,
            format,
            data_type,
            has_data: pixels.is_some(),
        });
    }

    fn tex_image_3d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage3D {
            target,
            level,
            internal_format,
            width,
            height,
            depth,
            format,
            data_type,
            has_data: pixels.is_some(),
        });
    }

    fn compressed_tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        data: &[u8],
    ) {
        self.record(GlCall::CompressedTexImage2D {
            target,
            level,
            internal_format,
            width,
            height,
            size: data.len(),
        });
    }

    fn compressed_tex_image_3d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        data: &[u8],
    ) {
        self.record(GlCall::CompressedTexImage3D {
            target,
            level,
            internal_format,
            width,
            height,
            depth,
            size: data.len(),
        });
    }

    fn tex_image_2d_multisample(
        &mut self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        self.record(GlCall::TexImage2DMultisample {
            target,
            samples,
            internal_format,
            width,
            height,
        });
    }

    fn tex_sub_image_2d(
        &mut self,
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        _pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage2D {
            target,
            level,
            x,
            y,
            width,
            height,
            format,
            data_type,
        });
    }

    fn tex_sub_image_3d(
        &mut self,
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        z: i32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        data_type: u32,
        _pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage3D {
            target,
            level,
            x,
            y,
            z,
            width,
            height,
            depth,
            format,
            data_type,
        });
    }

    fn generate_mipmap(&mut self, target: u32) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn create_framebuffer(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::Framebuffer);
        self.record(GlCall::CreateFramebuffer(name));
        Ok(name)
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.release(NameKind::Framebuffer, framebuffer);
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<u32>) {
        self.record(GlCall::BindFramebuffer(target, framebuffer));
    }

    fn create_renderbuffer(&mut self) -> Result<u32, String> {
        let name = self.allocate(NameKind::Renderbuffer);
        self.record(GlCall::CreateRenderbuffer(name));
        Ok(name)
    }

    fn delete_renderbuffer(&mut self, renderbuffer: u32) {
        self.release(NameKind::Renderbuffer, renderbuffer);
        self.record(GlCall::DeleteRenderbuffer(renderbuffer));
    }

    fn bind_renderbuffer(&mut self, renderbuffer: Option<u32>) {
        self.record(GlCall::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(&mut self, internal_format: u32, width: i32, height: i32) {
        self.record(GlCall::RenderbufferStorage {
            internal_format,
            width,
            height,
        });
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        self.record(GlCall::RenderbufferStorageMultisample {
            samples,
            internal_format,
            width,
            height,
        });
    }

    fn framebuffer_renderbuffer(&mut self, target: u32, attachment: u32, renderbuffer: Option<u32>) {
        self.record(GlCall::FramebufferRenderbuffer {
            target,
            attachment,
            renderbuffer,
        });
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<u32>,
        level: i32,
    ) {
        self.record(GlCall::FramebufferTexture2D {
            target,
            attachment,
            texture_target,
            texture,
            level,
        });
    }

    fn framebuffer_texture_layer(
        &mut self,
        target: u32,
        attachment: u32,
        texture: Option<u32>,
        level: i32,
        layer: i32,
    ) {
        self.record(GlCall::FramebufferTextureLayer {
            target,
            attachment,
            texture,
            level,
            layer,
        });
    }

    fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        self.record(GlCall::CheckFramebufferStatus(target));
        self.framebuffer_status
    }

    fn draw_buffer(&mut self, buffer: u32) {
        self.record(GlCall::DrawBuffer(buffer));
    }

    fn draw_buffers(&mut self, buffers: &[u32]) {
        self.record(GlCall::DrawBuffers(buffers.to_vec()));
    }

    fn read_buffer(&mut self, buffer: u32) {
        self.record(GlCall::ReadBuffer(buffer));
    }

    fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        self.record(GlCall::BlitFramebuffer {
            src,
            dst,
            mask,
            filter,
        });
    }

    fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        out: &mut [u8],
    ) {
        out.fill(self.pixel_fill);
        self.record(GlCall::ReadPixels {
            x,
            y,
            width,
            height,
            format,
            data_type,
        });
    }

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_arrays_instanced(&mut self, mode: u32, first: i32, count: i32, instances: i32) {
        self.record(GlCall::DrawArraysInstanced {
            mode,
            first,
            count,
            instances,
        });
    }

    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }

    fn draw_elements_instanced(
        &mut self,
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
        instances: i32,
    ) {
        self.record(GlCall::DrawElementsInstanced {
            mode,
            count,
            index_type,
            offset,
            instances,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_tracked() {
        let mut device = RecordingDevice::new();
        let a = device.create_buffer().unwrap();
        let b = device.create_texture().unwrap();
        assert_ne!(a, b);
        assert_eq!(device.live_objects(), 2);
        device.delete_buffer(a);
        device.delete_buffer(a);
        assert_eq!(device.live_objects(), 1);
        assert_eq!(device.double_deletes(), 1);
    }

    #[test]
    fn error_directive_fails_compilation() {
        let mut device = RecordingDevice::new();
        let good = device.create_shader(gl::VERTEX_SHADER).unwrap();
        device.shader_source(good, "#version 330 core\nvoid main() {}");
        device.compile_shader(good);
        assert!(device.shader_compile_status(good));

        let bad = device.create_shader(gl::FRAGMENT_SHADER).unwrap();
        device.shader_source(bad, "#error broken\n");
        device.compile_shader(bad);
        assert!(!device.shader_compile_status(bad));
        assert!(!device.shader_info_log(bad).is_empty());
    }

    #[test]
    fn locations_are_renumbered_on_every_link() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader(gl::VERTEX_SHADER).unwrap();
        device.shader_source(shader, "uniform vec4 m_Color; in vec3 inPosition;");
        device.compile_shader(shader);
        let program = device.create_program().unwrap();
        device.attach_shader(program, shader);
        device.link_program(program);

        let first = device.uniform_location(program, "m_Color");
        assert!(first.is_some());
        assert_eq!(device.uniform_location(program, "m_Missing"), None);
        assert_eq!(device.attrib_location(program, "inPosition"), Some(0));

        device.link_program(program);
        let second = device.uniform_location(program, "m_Color");
        assert!(second.is_some());
        assert_ne!(first, second);
    }
}
