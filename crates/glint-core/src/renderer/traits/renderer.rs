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

use crate::math::{LinearRgba, Rect};
use crate::renderer::api::*;
use crate::renderer::error::RenderError;
use std::rc::Rc;

/// The per-frame rendering facade implemented by every native backend.
///
/// A renderer owns one device context and must only be used from the thread
/// that owns it. Resource parameters carry their own native handle and dirty
/// flag: the renderer creates native objects lazily on first use, uploads them
/// whenever they are marked dirty and deletes the ones whose descriptors were
/// dropped at the next [`Renderer::on_frame`].
///
/// Every state-setting method compares the request against a cache of the
/// device state and only issues native calls for what actually changed.
pub trait Renderer: std::fmt::Debug {
    /// Negotiates the device capabilities and prepares the default state.
    ///
    /// Fails with [`RenderError::UnsupportedDevice`] on devices below the
    /// minimum requirements.
    fn initialize(&mut self) -> Result<(), RenderError>;

    /// The capabilities negotiated by [`Renderer::initialize`].
    fn capabilities(&self) -> &Capabilities;

    /// The profiling counters.
    fn statistics(&self) -> &Statistics;

    /// Forgets the cached device state.
    ///
    /// Must be called after external code may have changed device state.
    fn invalidate_state(&mut self);

    /// Forgets every native handle after the device context was lost.
    ///
    /// Live descriptors return to the unallocated and dirty state.
    fn reset_gl_objects(&mut self);

    /// Deletes every native object this renderer created.
    fn cleanup(&mut self);

    /// Clears the selected buffers of the bound target.
    fn clear_buffers(&mut self, color: bool, depth: bool, stencil: bool);

    /// Sets the clear colour.
    fn set_background_color(&mut self, color: LinearRgba);

    /// Enables alpha-to-coverage multisampling.
    fn set_alpha_to_coverage(&mut self, enabled: bool);

    /// Sets the depth range mapping.
    fn set_depth_range(&mut self, near: f32, far: f32);

    /// Applies the fixed-function state of the next draws.
    fn apply_render_state(&mut self, state: &RenderState);

    /// Sets the viewport. When the default target is bound, this also becomes
    /// the main viewport restored after offscreen rendering.
    fn set_viewport(&mut self, rect: Rect);

    /// Restricts rendering to a rectangle.
    fn set_clip_rect(&mut self, rect: Rect);

    /// Removes the clip rectangle.
    fn clear_clip_rect(&mut self);

    /// Binds a program, compiling and linking it first if needed, and uploads
    /// its changed uniforms.
    fn set_shader(&mut self, shader: &mut Shader) -> Result<(), RenderError>;

    /// Deletes a program and its sources.
    fn delete_shader(&mut self, shader: &Shader);

    /// Deletes one shader source.
    fn delete_shader_source(&mut self, source: &ShaderSource);

    /// Binds a texture to a unit, uploading its image if needed.
    fn set_texture(&mut self, unit: u32, texture: &Texture) -> Result<(), RenderError>;

    /// Uploads a texture's image if needed, without drawing with it.
    fn upload_texture(&mut self, texture: &Texture) -> Result<(), RenderError>;

    /// Writes `pixels` into `texture` at the given offset.
    fn modify_texture(
        &mut self,
        texture: &Texture,
        pixels: &Image,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError>;

    /// Deletes the native texture of an image.
    fn delete_image(&mut self, image: &Image);

    /// Uploads a buffer if needed.
    fn update_buffer_data(&mut self, buffer: &VertexBuffer) -> Result<(), RenderError>;

    /// Deletes the native object of a buffer.
    fn delete_buffer(&mut self, buffer: &VertexBuffer);

    /// Binds an offscreen target, or the default target for `None`.
    fn set_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>) -> Result<(), RenderError>;

    /// Blits colour (and optionally depth) from one target to another.
    fn copy_frame_buffer(
        &mut self,
        src: Option<&FrameBuffer>,
        dst: Option<&FrameBuffer>,
        copy_depth: bool,
    ) -> Result<(), RenderError>;

    /// Reads the current viewport of a target as tightly packed RGBA8.
    fn read_frame_buffer(
        &mut self,
        frame_buffer: Option<&FrameBuffer>,
        out: &mut [u8],
    ) -> Result<(), RenderError>;

    /// Deletes a framebuffer and its renderbuffers.
    fn delete_frame_buffer(&mut self, frame_buffer: &FrameBuffer);

    /// Redirects the default target to an offscreen one.
    ///
    /// While set, binding, blitting from or to, and reading back `None` use the
    /// override. `None` restores the device's default framebuffer. If the default
    /// target is bound when this is called, the new main target is bound at once.
    fn set_main_frame_buffer_override(
        &mut self,
        frame_buffer: Option<Rc<FrameBuffer>>,
    ) -> Result<(), RenderError>;

    /// Draws a mesh with the bound program.
    ///
    /// `lod` selects a level-of-detail index buffer, `instance_data` supplies
    /// extra per-instance buffers.
    fn render_mesh(
        &mut self,
        mesh: &Mesh,
        lod: usize,
        instance_count: u32,
        instance_data: &[VertexBuffer],
    ) -> Result<(), RenderError>;

    /// Enables sRGB encoding of writes to the default target.
    fn set_main_frame_buffer_srgb(&mut self, enabled: bool);

    /// Enables linearization of sRGB images when sampled.
    fn set_linearize_srgb_images(&mut self, enabled: bool);

    /// Marks a frame boundary: reclaims orphaned native objects and starts a
    /// new statistics frame.
    fn on_frame(&mut self);
}
