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

//! The generic immediate-mode renderer shared by every GL backend.
//!
//! [`GlRenderer`] owns the device, the state cache, the format table and the
//! native object registry. The [`Renderer`] implementation below only
//! dispatches; the work is split by resource kind across the submodules.

mod buffer;
mod draw;
mod framebuffer;
mod shader;
mod state;
mod texture;

use super::caps::negotiate;
use super::context::RenderContext;
use super::device::GlDevice;
use super::enums as gl;
use super::formats::FormatTable;
use super::objects::{delete_native, NativeObjectManager, Reclaimed};
use glint_core::math::{LinearRgba, Rect};
use glint_core::renderer::api::{
    AttributeTable, Capabilities, Caps, FrameBuffer, GpuObject, Image, Mesh, NativeHandle,
    NativeKind, ObjectId, RenderState, RendererConfig, Shader, ShaderSource, Statistics, Texture,
    VertexBuffer, WeakGpuObject,
};
use glint_core::renderer::{RenderError, Renderer, ResourceError};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Converts an unsigned size to the signed form the device takes.
pub(crate) fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn backend_error(message: String) -> RenderError {
    ResourceError::BackendError(message).into()
}

/// The program bound by the last `set_shader`.
#[derive(Debug, Clone)]
struct BoundShader {
    program: u32,
    attributes: Rc<RefCell<AttributeTable>>,
}

/// A colour attachment whose mip chain is rebuilt when its target is left.
#[derive(Debug, Clone)]
struct MipTarget {
    image: WeakGpuObject,
    target: u32,
}

/// The offscreen target currently bound.
#[derive(Debug, Clone)]
struct ActiveTarget {
    id: ObjectId,
    handle: u32,
    mip_targets: Vec<MipTarget>,
}

/// An OpenGL-style renderer on top of any [`GlDevice`].
///
/// Every state-setting entry point diffs its request against a
/// [`RenderContext`] and only reaches the device for what changed. Resource
/// descriptors are uploaded lazily: a native object is created the first time a
/// descriptor is used, registered for reclamation, and re-uploaded whenever the
/// descriptor is marked dirty.
///
/// The renderer is `!Send`; it must stay on the thread that owns the device
/// context.
pub struct GlRenderer<D: GlDevice> {
    device: D,
    config: RendererConfig,
    caps: Capabilities,
    formats: FormatTable,
    context: RenderContext,
    objects: NativeObjectManager,
    stats: Statistics,
    initialized: bool,

    vertex_array: Option<u32>,
    bound_shader: Option<BoundShader>,
    active_target: Option<ActiveTarget>,
    main_override: Option<Rc<FrameBuffer>>,

    main_viewport: Rect,
    clip_rect: Option<Rect>,
    linearize_srgb: bool,
    main_framebuffer_srgb: bool,
    initial_draw_buffer: u32,
    initial_read_buffer: u32,
}

impl<D: GlDevice> fmt::Debug for GlRenderer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlRenderer")
            .field("config", &self.config)
            .field("caps", &self.caps)
            .field("initialized", &self.initialized)
            .field("registered_objects", &self.objects.len())
            .field("stats", &self.stats)
            .field("main_viewport", &self.main_viewport)
            .field("clip_rect", &self.clip_rect)
            .field(
                "active_target",
                &self.active_target.as_ref().map(|target| target.id),
            )
            .finish_non_exhaustive()
    }
}

impl<D: GlDevice> GlRenderer<D> {
    /// Creates an uninitialized renderer driving `device`.
    ///
    /// [`Renderer::initialize`] must be called before any resource is used.
    pub fn new(device: D, config: RendererConfig) -> Self {
        Self {
            device,
            config,
            caps: Capabilities::default(),
            formats: FormatTable::new(Caps::EMPTY),
            context: RenderContext::default(),
            objects: NativeObjectManager::new(),
            stats: Statistics::default(),
            initialized: false,
            vertex_array: None,
            bound_shader: None,
            active_target: None,
            main_override: None,
            main_viewport: Rect::default(),
            clip_rect: None,
            linearize_srgb: false,
            main_framebuffer_srgb: false,
            initial_draw_buffer: gl::BACK,
            initial_read_buffer: gl::BACK,
        }
    }

    /// The device this renderer drives.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the device, for callers that issue their own calls.
    ///
    /// Call [`Renderer::invalidate_state`] afterwards if device state changed.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Consumes the renderer and returns its device. Native objects are not deleted.
    pub fn into_device(self) -> D {
        self.device
    }

    /// The configuration the renderer was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The cached device state.
    pub fn render_context(&self) -> &RenderContext {
        &self.context
    }

    /// The format table built for the negotiated capabilities.
    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    /// The number of native objects currently registered for reclamation.
    pub fn registered_objects(&self) -> usize {
        self.objects.len()
    }

    /// The offscreen target standing in for the default one, if any.
    pub fn main_frame_buffer_override(&self) -> Option<&FrameBuffer> {
        self.main_override.as_deref()
    }

    /// The viewport restored when the default target is bound again.
    pub fn main_viewport(&self) -> Rect {
        self.main_viewport
    }

    fn ensure_initialized(&self) -> Result<(), RenderError> {
        if self.initialized {
            Ok(())
        } else {
            Err(RenderError::NotInitialized)
        }
    }

    /// Stores a freshly created native name on its descriptor and registers it.
    fn track(&mut self, object: &GpuObject, name: u32) {
        object.set_handle(NativeHandle(name));
        self.objects.register(object);
        self.stats.on_new_object(object.kind());
        log::trace!("Created {:?} object {name} for {:?}", object.kind(), object.id());
    }

    /// Drops every cache entry that references a deleted native object.
    fn forget_native(&mut self, kind: NativeKind, handle: NativeHandle) {
        let name = handle.0;
        match kind {
            NativeKind::Buffer => self.context.forget_buffer(name),
            NativeKind::Texture => self.context.forget_texture(name),
            NativeKind::Program => {
                self.context.forget_program(name);
                if self
                    .bound_shader
                    .as_ref()
                    .is_some_and(|bound| bound.program == name)
                {
                    self.bound_shader = None;
                }
            }
            NativeKind::FrameBuffer => {
                self.context.forget_framebuffer(name);
                if self
                    .active_target
                    .as_ref()
                    .is_some_and(|target| target.handle == name)
                {
                    self.active_target = None;
                }
            }
            NativeKind::RenderBuffer => self.context.forget_renderbuffer(name),
            NativeKind::ShaderSource => {}
        }
        self.stats.on_delete_object(kind);
    }

    fn forget_reclaimed(&mut self, reclaimed: Vec<Reclaimed>) {
        for Reclaimed { kind, handle } in reclaimed {
            self.forget_native(kind, handle);
        }
    }

    /// Deletes the native object of a descriptor right away.
    fn delete_object(&mut self, object: &GpuObject) {
        let Some(handle) = object.handle() else {
            log::warn!(
                "Cannot delete {:?} object {:?}: it has no native handle",
                object.kind(),
                object.id()
            );
            return;
        };
        self.objects.unregister(object.id());
        delete_native(&mut self.device, object.kind(), handle);
        object.reset();
        self.forget_native(object.kind(), handle);
    }

    /// Creates the shared vertex array on first use and keeps it bound.
    fn ensure_vertex_array(&mut self) -> Result<(), RenderError> {
        if !self.caps.has(Caps::VERTEX_BUFFER_ARRAY) {
            return Ok(());
        }
        let vao = match self.vertex_array {
            Some(vao) => vao,
            None => {
                let vao = self.device.create_vertex_array().map_err(backend_error)?;
                self.vertex_array = Some(vao);
                vao
            }
        };
        if self.context.vertex_array != Some(vao) {
            self.device.bind_vertex_array(Some(vao));
            self.context.vertex_array = Some(vao);
        }
        Ok(())
    }

    fn read_initial_buffers(&mut self) {
        if self.caps.has(Caps::FRAME_BUFFER) {
            self.initial_draw_buffer = self.device.get_integer(gl::DRAW_BUFFER) as u32;
            self.initial_read_buffer = self.device.get_integer(gl::READ_BUFFER) as u32;
        }
    }
}

impl<D: GlDevice> Renderer for GlRenderer<D> {
    fn initialize(&mut self) -> Result<(), RenderError> {
        let caps = negotiate(&mut self.device)?;
        self.formats = FormatTable::new(caps.caps);
        self.caps = caps;

        if self.caps.has(Caps::MULTISAMPLE) && !self.device.is_enabled(gl::MULTISAMPLE) {
            self.device.enable(gl::MULTISAMPLE);
        }
        // Point sizes come from the vertex shader.
        self.device.enable(gl::PROGRAM_POINT_SIZE);
        if self.caps.has(Caps::SEAMLESS_CUBEMAP) {
            self.device.enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);
        }
        self.device.pixel_store_i32(gl::UNPACK_ALIGNMENT, 1);
        self.device.pixel_store_i32(gl::PACK_ALIGNMENT, 1);

        self.initialized = true;
        self.ensure_vertex_array()?;
        self.read_initial_buffers();

        if self.config.main_framebuffer_srgb {
            self.set_main_frame_buffer_srgb(true);
        }
        if self.config.linearize_srgb_images {
            self.set_linearize_srgb_images(true);
        }
        Ok(())
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn invalidate_state(&mut self) {
        self.context.reset();
        self.bound_shader = None;
        self.read_initial_buffers();
    }

    fn reset_gl_objects(&mut self) {
        log::info!("Resetting objects and invalidating state");
        self.objects.reset_objects();
        self.stats.clear_memory();
        self.vertex_array = None;
        self.active_target = None;
        self.context.samplers.clear();
        self.invalidate_state();
    }

    fn cleanup(&mut self) {
        log::info!("Deleting objects and invalidating state");
        let reclaimed = self.objects.delete_all(&mut self.device);
        self.forget_reclaimed(reclaimed);
        if let Some(vao) = self.vertex_array.take() {
            self.device.delete_vertex_array(vao);
        }
        self.active_target = None;
        self.invalidate_state();
    }

    fn clear_buffers(&mut self, color: bool, depth: bool, stencil: bool) {
        self.clear(color, depth, stencil);
    }

    fn set_background_color(&mut self, color: LinearRgba) {
        self.apply_clear_color(color);
    }

    fn set_alpha_to_coverage(&mut self, enabled: bool) {
        self.apply_alpha_to_coverage(enabled);
    }

    fn set_depth_range(&mut self, near: f32, far: f32) {
        self.apply_depth_range(near, far);
    }

    fn apply_render_state(&mut self, state: &RenderState) {
        self.apply_state(state);
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.apply_viewport(rect);
        if self.active_target.is_none() {
            self.main_viewport = rect;
        }
    }

    fn set_clip_rect(&mut self, rect: Rect) {
        self.apply_clip_rect(Some(rect));
    }

    fn clear_clip_rect(&mut self) {
        self.apply_clip_rect(None);
    }

    fn set_shader(&mut self, shader: &mut Shader) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.bind_shader(shader)
    }

    fn delete_shader(&mut self, shader: &Shader) {
        self.delete_program(shader);
    }

    fn delete_shader_source(&mut self, source: &ShaderSource) {
        self.delete_object(source.object());
    }

    fn set_texture(&mut self, unit: u32, texture: &Texture) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.bind_texture(unit, texture)
    }

    fn upload_texture(&mut self, texture: &Texture) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.ensure_texture(texture, 0)
    }

    fn modify_texture(
        &mut self,
        texture: &Texture,
        pixels: &Image,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.write_sub_image(texture, pixels, x, y)
    }

    fn delete_image(&mut self, image: &Image) {
        self.delete_object(image.object());
    }

    fn update_buffer_data(&mut self, buffer: &VertexBuffer) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.upload_buffer(buffer).map(|_| ())
    }

    fn delete_buffer(&mut self, buffer: &VertexBuffer) {
        self.delete_object(buffer.object());
    }

    fn set_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.bind_frame_buffer(frame_buffer)
    }

    fn copy_frame_buffer(
        &mut self,
        src: Option<&FrameBuffer>,
        dst: Option<&FrameBuffer>,
        copy_depth: bool,
    ) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.blit_frame_buffer(src, dst, copy_depth)
    }

    fn read_frame_buffer(
        &mut self,
        frame_buffer: Option<&FrameBuffer>,
        out: &mut [u8],
    ) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.read_pixels(frame_buffer, out)
    }

    fn delete_frame_buffer(&mut self, frame_buffer: &FrameBuffer) {
        self.delete_target(frame_buffer);
    }

    fn set_main_frame_buffer_override(
        &mut self,
        frame_buffer: Option<Rc<FrameBuffer>>,
    ) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.override_main_frame_buffer(frame_buffer)
    }

    fn render_mesh(
        &mut self,
        mesh: &Mesh,
        lod: usize,
        instance_count: u32,
        instance_data: &[VertexBuffer],
    ) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.draw_mesh(mesh, lod, instance_count, instance_data)
    }

    fn set_main_frame_buffer_srgb(&mut self, enabled: bool) {
        if !self.caps.has(Caps::SRGB) {
            log::warn!("sRGB framebuffer is not supported by video hardware, but was requested.");
            return;
        }
        self.main_framebuffer_srgb = enabled;
        if self.active_target.is_none() {
            self.apply_framebuffer_srgb(enabled);
        }
    }

    fn set_linearize_srgb_images(&mut self, enabled: bool) {
        if !self.caps.has(Caps::SRGB) {
            log::warn!("sRGB images are not supported by video hardware, cannot linearize them.");
            return;
        }
        self.linearize_srgb = enabled;
    }

    fn on_frame(&mut self) {
        let reclaimed = self
            .objects
            .sweep(&mut self.device, self.config.max_reclaims_per_frame);
        self.forget_reclaimed(reclaimed);
        self.stats.on_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::backends::recording::RecordingDevice;

    #[test]
    fn resources_require_initialization() {
        let mut renderer = GlRenderer::new(RecordingDevice::new(), RendererConfig::default());
        let mut shader = Shader::new();
        assert!(matches!(
            renderer.set_shader(&mut shader),
            Err(RenderError::NotInitialized)
        ));
        assert!(renderer.device().calls().is_empty());
    }

    #[test]
    fn initialize_prepares_the_default_state() {
        let mut renderer = GlRenderer::new(RecordingDevice::new(), RendererConfig::default());
        renderer.initialize().unwrap();
        assert!(renderer.capabilities().has(Caps::CORE_PROFILE));
        assert!(renderer.render_context().vertex_array.is_some());
        assert_eq!(renderer.initial_draw_buffer, gl::BACK);
    }

    #[test]
    fn srgb_toggles_need_the_capability() {
        let mut renderer = GlRenderer::new(RecordingDevice::gl21(), RendererConfig::default());
        renderer.initialize().unwrap();
        renderer.device_mut().clear_calls();
        renderer.set_main_frame_buffer_srgb(true);
        renderer.set_linearize_srgb_images(true);
        assert!(!renderer.main_framebuffer_srgb);
        assert!(!renderer.linearize_srgb);
        assert!(renderer.device().calls().is_empty());
    }
}
