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

//! A [`GlDevice`] over a live `glow` context.

use crate::graphics::gl::device::GlDevice;
use glint_core::renderer::api::UniformValue;
use glow::{HasContext, PixelPackData, PixelUnpackData};
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;

/// Wraps a native name in one of glow's newtypes.
///
/// Zero is the "no object" name, so it maps to `None`.
macro_rules! native {
    ($ty:ident, $name:expr) => {
        NonZeroU32::new($name).map(glow::$ty)
    };
}

fn created<T>(result: Result<T, String>, name: impl Fn(T) -> NonZeroU32) -> Result<u32, String> {
    result.map(|object| name(object).get())
}

/// Forwards every device call to a `glow::Context`.
///
/// The context must be current on the calling thread for the whole life of the
/// device.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wraps a loaded context.
    ///
    /// # Safety
    ///
    /// `gl` must be current on this thread, and must stay current whenever a
    /// method of the device is called.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// The wrapped context.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

impl fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowDevice").finish_non_exhaustive()
    }
}

impl GlDevice for GlowDevice {
    fn get_string(&mut self, name: u32) -> String {
        unsafe { self.gl.get_parameter_string(name) }
    }

    fn get_integer(&mut self, pname: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(pname) }
    }

    fn get_float(&mut self, pname: u32) -> f32 {
        unsafe { self.gl.get_parameter_f32(pname) }
    }

    fn extensions(&mut self) -> HashSet<String> {
        self.gl.supported_extensions().clone()
    }

    fn is_enabled(&mut self, cap: u32) -> bool {
        unsafe { self.gl.is_enabled(cap) }
    }

    fn enable(&mut self, cap: u32) {
        unsafe { self.gl.enable(cap) }
    }

    fn disable(&mut self, cap: u32) {
        unsafe { self.gl.disable(cap) }
    }

    fn polygon_mode(&mut self, face: u32, mode: u32) {
        unsafe { self.gl.polygon_mode(face, mode) }
    }

    fn depth_func(&mut self, func: u32) {
        unsafe { self.gl.depth_func(func) }
    }

    fn depth_mask(&mut self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) }
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        unsafe { self.gl.color_mask(red, green, blue, alpha) }
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        unsafe { self.gl.polygon_offset(factor, units) }
    }

    fn cull_face(&mut self, face: u32) {
        unsafe { self.gl.cull_face(face) }
    }

    fn blend_func(&mut self, src: u32, dst: u32) {
        unsafe { self.gl.blend_func(src, dst) }
    }

    fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, depth_pass: u32) {
        unsafe { self.gl.stencil_op_separate(face, fail, depth_fail, depth_pass) }
    }

    fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32) {
        unsafe { self.gl.stencil_func_separate(face, func, reference, mask) }
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) }
    }

    fn clear(&mut self, mask: u32) {
        unsafe { self.gl.clear(mask) }
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        unsafe { self.gl.depth_range_f32(near, far) }
    }

    fn line_width(&mut self, width: f32) {
        unsafe { self.gl.line_width(width) }
    }

    // --- Buffers and vertex arrays ---

    fn create_buffer(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_buffer() }, |b| b.0)
    }

    fn delete_buffer(&mut self, buffer: u32) {
        if let Some(buffer) = native!(NativeBuffer, buffer) {
            unsafe { self.gl.delete_buffer(buffer) }
        }
    }

    fn bind_buffer(&mut self, target: u32, buffer: Option<u32>) {
        let buffer = buffer.and_then(|name| native!(NativeBuffer, name));
        unsafe { self.gl.bind_buffer(target, buffer) }
    }

    fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) }
    }

    fn buffer_sub_data(&mut self, target: u32, offset: i32, data: &[u8]) {
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset, data) }
    }

    fn create_vertex_array(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_vertex_array() }, |v| v.0)
    }

    fn bind_vertex_array(&mut self, vao: Option<u32>) {
        let vao = vao.and_then(|name| native!(NativeVertexArray, name));
        unsafe { self.gl.bind_vertex_array(vao) }
    }

    fn delete_vertex_array(&mut self, vao: u32) {
        if let Some(vao) = native!(NativeVertexArray, vao) {
            unsafe { self.gl.delete_vertex_array(vao) }
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
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
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset)
        }
    }

    fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
        unsafe { self.gl.vertex_attrib_divisor(index, divisor) }
    }

    // --- Shaders and programs ---

    fn create_shader(&mut self, stage: u32) -> Result<u32, String> {
        created(unsafe { self.gl.create_shader(stage) }, |s| s.0)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(shader) = native!(NativeShader, shader) {
            unsafe { self.gl.shader_source(shader, source) }
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        if let Some(shader) = native!(NativeShader, shader) {
            unsafe { self.gl.compile_shader(shader) }
        }
    }

    fn shader_compile_status(&mut self, shader: u32) -> bool {
        native!(NativeShader, shader)
            .map(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
            .unwrap_or(false)
    }

    fn shader_info_log(&mut self, shader: u32) -> String {
        native!(NativeShader, shader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        if let Some(shader) = native!(NativeShader, shader) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn create_program(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_program() }, |p| p.0)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) =
            (native!(NativeProgram, program), native!(NativeShader, shader))
        {
            unsafe { self.gl.attach_shader(program, shader) }
        }
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) =
            (native!(NativeProgram, program), native!(NativeShader, shader))
        {
            unsafe { self.gl.detach_shader(program, shader) }
        }
    }

    fn bind_frag_data_location(&mut self, program: u32, color: u32, name: &str) {
        if let Some(program) = native!(NativeProgram, program) {
            unsafe { self.gl.bind_frag_data_location(program, color, name) }
        }
    }

    fn link_program(&mut self, program: u32) {
        if let Some(program) = native!(NativeProgram, program) {
            unsafe { self.gl.link_program(program) }
        }
    }

    fn program_link_status(&mut self, program: u32) -> bool {
        native!(NativeProgram, program)
            .map(|program| unsafe { self.gl.get_program_link_status(program) })
            .unwrap_or(false)
    }

    fn program_info_log(&mut self, program: u32) -> String {
        native!(NativeProgram, program)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<u32>) {
        let program = program.and_then(|name| native!(NativeProgram, name));
        unsafe { self.gl.use_program(program) }
    }

    fn delete_program(&mut self, program: u32) {
        if let Some(program) = native!(NativeProgram, program) {
            unsafe { self.gl.delete_program(program) }
        }
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        let program = native!(NativeProgram, program)?;
        unsafe { self.gl.get_uniform_location(program, name) }
            .and_then(|location| i32::try_from(location.0).ok())
    }

    fn attrib_location(&mut self, program: u32, name: &str) -> Option<u32> {
        let program = native!(NativeProgram, program)?;
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn set_uniform(&mut self, location: i32, value: &UniformValue) {
        let Ok(raw) = u32::try_from(location) else {
            return;
        };
        let location = glow::NativeUniformLocation(raw);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, *v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, *v),
                UniformValue::Bool(v) => self.gl.uniform_1_i32(location, i32::from(*v)),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32_slice(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32_slice(location, v),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32_slice(location, v),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(location, false, m),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, m),
                UniformValue::FloatArray(values) => self.gl.uniform_1_f32_slice(location, values),
                UniformValue::Vec4Array(values) => self
                    .gl
                    .uniform_4_f32_slice(location, bytemuck::cast_slice(values)),
            }
        }
    }

    // --- Textures ---

    fn create_texture(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_texture() }, |t| t.0)
    }

    fn delete_texture(&mut self, texture: u32) {
        if let Some(texture) = native!(NativeTexture, texture) {
            unsafe { self.gl.delete_texture(texture) }
        }
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(unit) }
    }

    fn bind_texture(&mut self, target: u32, texture: Option<u32>) {
        let texture = texture.and_then(|name| native!(NativeTexture, name));
        unsafe { self.gl.bind_texture(target, texture) }
    }

    fn tex_parameter_i32(&mut self, target: u32, pname: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, pname, value) }
    }

    fn tex_parameter_f32(&mut self, target: u32, pname: u32, value: f32) {
        unsafe { self.gl.tex_parameter_f32(target, pname, value) }
    }

    fn pixel_store_i32(&mut self, pname: u32, value: i32) {
        unsafe { self.gl.pixel_store_i32(pname, value) }
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
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format as i32,
                width,
                height,
                0,
                format,
                data_type,
                pixels,
            )
        }
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
        unsafe {
            self.gl.tex_image_3d(
                target,
                level,
                internal_format as i32,
                width,
                height,
                depth,
                0,
                format,
                data_type,
                pixels,
            )
        }
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
        let size = i32::try_from(data.len()).unwrap_or(i32::MAX);
        unsafe {
            self.gl.compressed_tex_image_2d(
                target,
                level,
                internal_format as i32,
                width,
                height,
                0,
                size,
                data,
            )
        }
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
        let size = i32::try_from(data.len()).unwrap_or(i32::MAX);
        unsafe {
            self.gl.compressed_tex_image_3d(
                target,
                level,
                internal_format as i32,
                width,
                height,
                depth,
                0,
                size,
                data,
            )
        }
    }

    fn tex_image_2d_multisample(
        &mut self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            self.gl.tex_image_2d_multisample(
                target,
                samples,
                internal_format as i32,
                width,
                height,
                true,
            )
        }
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
        pixels: &[u8],
    ) {
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                level,
                x,
                y,
                width,
                height,
                format,
                data_type,
                PixelUnpackData::Slice(pixels),
            )
        }
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
        pixels: &[u8],
    ) {
        unsafe {
            self.gl.tex_sub_image_3d(
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
                PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn generate_mipmap(&mut self, target: u32) {
        unsafe { self.gl.generate_mipmap(target) }
    }

    // --- Framebuffers ---

    fn create_framebuffer(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_framebuffer() }, |f| f.0)
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        if let Some(framebuffer) = native!(NativeFramebuffer, framebuffer) {
            unsafe { self.gl.delete_framebuffer(framebuffer) }
        }
    }

    fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<u32>) {
        let framebuffer = framebuffer.and_then(|name| native!(NativeFramebuffer, name));
        unsafe { self.gl.bind_framebuffer(target, framebuffer) }
    }

    fn create_renderbuffer(&mut self) -> Result<u32, String> {
        created(unsafe { self.gl.create_renderbuffer() }, |r| r.0)
    }

    fn delete_renderbuffer(&mut self, renderbuffer: u32) {
        if let Some(renderbuffer) = native!(NativeRenderbuffer, renderbuffer) {
            unsafe { self.gl.delete_renderbuffer(renderbuffer) }
        }
    }

    fn bind_renderbuffer(&mut self, renderbuffer: Option<u32>) {
        let renderbuffer = renderbuffer.and_then(|name| native!(NativeRenderbuffer, name));
        unsafe { self.gl.bind_renderbuffer(glow::RENDERBUFFER, renderbuffer) }
    }

    fn renderbuffer_storage(&mut self, internal_format: u32, width: i32, height: i32) {
        unsafe {
            self.gl
                .renderbuffer_storage(glow::RENDERBUFFER, internal_format, width, height)
        }
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            self.gl.renderbuffer_storage_multisample(
                glow::RENDERBUFFER,
                samples,
                internal_format,
                width,
                height,
            )
        }
    }

    fn framebuffer_renderbuffer(&mut self, target: u32, attachment: u32, renderbuffer: Option<u32>) {
        let renderbuffer = renderbuffer.and_then(|name| native!(NativeRenderbuffer, name));
        unsafe {
            self.gl
                .framebuffer_renderbuffer(target, attachment, glow::RENDERBUFFER, renderbuffer)
        }
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<u32>,
        level: i32,
    ) {
        let texture = texture.and_then(|name| native!(NativeTexture, name));
        unsafe {
            self.gl
                .framebuffer_texture_2d(target, attachment, texture_target, texture, level)
        }
    }

    fn framebuffer_texture_layer(
        &mut self,
        target: u32,
        attachment: u32,
        texture: Option<u32>,
        level: i32,
        layer: i32,
    ) {
        let texture = texture.and_then(|name| native!(NativeTexture, name));
        unsafe {
            self.gl
                .framebuffer_texture_layer(target, attachment, texture, level, layer)
        }
    }

    fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn draw_buffer(&mut self, buffer: u32) {
        unsafe { self.gl.draw_buffer(buffer) }
    }

    fn draw_buffers(&mut self, buffers: &[u32]) {
        unsafe { self.gl.draw_buffers(buffers) }
    }

    fn read_buffer(&mut self, buffer: u32) {
        unsafe { self.gl.read_buffer(buffer) }
    }

    fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        unsafe {
            self.gl.blit_framebuffer(
                src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter,
            )
        }
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
        unsafe {
            self.gl.read_pixels(
                x,
                y,
                width,
                height,
                format,
                data_type,
                PixelPackData::Slice(out),
            )
        }
    }

    // --- Draws ---

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn draw_arrays_instanced(&mut self, mode: u32, first: i32, count: i32, instances: i32) {
        unsafe { self.gl.draw_arrays_instanced(mode, first, count, instances) }
    }

    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, index_type, offset) }
    }

    fn draw_elements_instanced(
        &mut self,
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
        instances: i32,
    ) {
        unsafe {
            self.gl
                .draw_elements_instanced(mode, count, index_type, offset, instances)
        }
    }
}
