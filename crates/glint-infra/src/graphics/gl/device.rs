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

//! The thin device-call adapter every GL backend implements.

use glint_core::renderer::api::UniformValue;
use std::collections::HashSet;

/// One-to-one access to the native calls of an immediate-mode GL device.
///
/// Implementations perform no caching and no validation: every method maps to
/// exactly one native call (or one query). Object names are plain `u32`, with
/// `None` standing for the "zero" object when binding.
///
/// Creation methods return the driver's error message when the device refuses
/// to allocate a name.
#[allow(missing_docs)]
pub trait GlDevice {
    // --- Queries ---
    fn get_string(&mut self, name: u32) -> String;
    fn get_integer(&mut self, pname: u32) -> i32;
    fn get_float(&mut self, pname: u32) -> f32;
    fn extensions(&mut self) -> HashSet<String>;
    fn is_enabled(&mut self, cap: u32) -> bool;

    // --- Fixed-function state ---
    fn enable(&mut self, cap: u32);
    fn disable(&mut self, cap: u32);
    fn polygon_mode(&mut self, face: u32, mode: u32);
    fn depth_func(&mut self, func: u32);
    fn depth_mask(&mut self, enabled: bool);
    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);
    fn polygon_offset(&mut self, factor: f32, units: f32);
    fn cull_face(&mut self, face: u32);
    fn blend_func(&mut self, src: u32, dst: u32);
    fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, depth_pass: u32);
    fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&mut self, mask: u32);
    fn depth_range(&mut self, near: f32, far: f32);
    fn line_width(&mut self, width: f32);

    // --- Buffers and vertex arrays ---
    fn create_buffer(&mut self) -> Result<u32, String>;
    fn delete_buffer(&mut self, buffer: u32);
    fn bind_buffer(&mut self, target: u32, buffer: Option<u32>);
    fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32);
    fn buffer_sub_data(&mut self, target: u32, offset: i32, data: &[u8]);
    fn create_vertex_array(&mut self) -> Result<u32, String>;
    fn bind_vertex_array(&mut self, vao: Option<u32>);
    fn delete_vertex_array(&mut self, vao: u32);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32);

    // --- Shaders and programs ---
    fn create_shader(&mut self, stage: u32) -> Result<u32, String>;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&mut self, shader: u32) -> bool;
    fn shader_info_log(&mut self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);
    fn create_program(&mut self) -> Result<u32, String>;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn detach_shader(&mut self, program: u32, shader: u32);
    fn bind_frag_data_location(&mut self, program: u32, color: u32, name: &str);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&mut self, program: u32) -> bool;
    fn program_info_log(&mut self, program: u32) -> String;
    fn use_program(&mut self, program: Option<u32>);
    fn delete_program(&mut self, program: u32);
    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32>;
    fn attrib_location(&mut self, program: u32, name: &str) -> Option<u32>;
    fn set_uniform(&mut self, location: i32, value: &UniformValue);

    // --- Textures ---
    fn create_texture(&mut self) -> Result<u32, String>;
    fn delete_texture(&mut self, texture: u32);
    fn active_texture(&mut self, unit: u32);
    fn bind_texture(&mut self, target: u32, texture: Option<u32>);
    fn tex_parameter_i32(&mut self, target: u32, pname: u32, value: i32);
    fn tex_parameter_f32(&mut self, target: u32, pname: u32, value: f32);
    fn pixel_store_i32(&mut self, pname: u32, value: i32);
    #[allow(clippy::too_many_arguments)]
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
    );
    #[allow(clippy::too_many_arguments)]
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
    );
    fn compressed_tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        data: &[u8],
    );
    #[allow(clippy::too_many_arguments)]
    fn compressed_tex_image_3d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        data: &[u8],
    );
    fn tex_image_2d_multisample(
        &mut self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    #[allow(clippy::too_many_arguments)]
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
    );
    #[allow(clippy::too_many_arguments)]
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
    );
    fn generate_mipmap(&mut self, target: u32);

    // --- Framebuffers ---
    fn create_framebuffer(&mut self) -> Result<u32, String>;
    fn delete_framebuffer(&mut self, framebuffer: u32);
    fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<u32>);
    fn create_renderbuffer(&mut self) -> Result<u32, String>;
    fn delete_renderbuffer(&mut self, renderbuffer: u32);
    fn bind_renderbuffer(&mut self, renderbuffer: Option<u32>);
    fn renderbuffer_storage(&mut self, internal_format: u32, width: i32, height: i32);
    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    fn framebuffer_renderbuffer(&mut self, target: u32, attachment: u32, renderbuffer: Option<u32>);
    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<u32>,
        level: i32,
    );
    fn framebuffer_texture_layer(
        &mut self,
        target: u32,
        attachment: u32,
        texture: Option<u32>,
        level: i32,
        layer: i32,
    );
    fn check_framebuffer_status(&mut self, target: u32) -> u32;
    fn draw_buffer(&mut self, buffer: u32);
    fn draw_buffers(&mut self, buffers: &[u32]);
    fn read_buffer(&mut self, buffer: u32);
    fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32);
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        out: &mut [u8],
    );

    // --- Draws ---
    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32);
    fn draw_arrays_instanced(&mut self, mode: u32, first: i32, count: i32, instances: i32);
    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32);
    fn draw_elements_instanced(
        &mut self,
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
        instances: i32,
    );
}
