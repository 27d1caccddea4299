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

//! Offscreen targets: validation, attachment, completeness and blits.

use super::{backend_error, gl_size, ActiveTarget, GlRenderer, MipTarget};
use crate::graphics::gl::context::binding;
use crate::graphics::gl::conversions::{depth_attachment_point, IntoGl};
use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use glint_core::math::Rect;
use glint_core::renderer::api::{
    AttachmentSlot, Caps, FrameBuffer, NativeHandle, RenderBuffer, TextureType,
};
use glint_core::renderer::{FramebufferError, RenderError, ResourceError};
use std::rc::Rc;

fn framebuffer_error(status: u32) -> FramebufferError {
    match status {
        gl::FRAMEBUFFER_UNSUPPORTED => FramebufferError::UnsupportedFormatCombination,
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferError::IncompleteAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferError::MissingAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferError::MismatchedDimensions,
        gl::FRAMEBUFFER_INCOMPLETE_FORMATS => FramebufferError::MismatchedFormats,
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferError::IncompleteDrawBuffer,
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferError::IncompleteReadBuffer,
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferError::IncompleteMultisample,
        gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferError::IncompleteLayerTargets,
        gl::FRAMEBUFFER_UNDEFINED => FramebufferError::Undefined,
        other => FramebufferError::Unknown(other),
    }
}

/// The `[x0, y0, x1, y1]` corners of a rectangle, as blits take them.
fn corners(rect: Rect) -> [i32; 4] {
    [
        rect.x,
        rect.y,
        rect.x.saturating_add(gl_size(rect.width)),
        rect.y.saturating_add(gl_size(rect.height)),
    ]
}

fn full_rect(frame_buffer: &FrameBuffer) -> Rect {
    Rect::new(0, 0, frame_buffer.width(), frame_buffer.height())
}

impl<D: GlDevice> GlRenderer<D> {
    /// Checks everything that can be checked without touching the device.
    fn validate_frame_buffer(&self, frame_buffer: &FrameBuffer) -> Result<(), RenderError> {
        if !self.caps.has(Caps::FRAME_BUFFER) {
            return Err(RenderError::UnsupportedOperation(
                "framebuffer objects".to_string(),
            ));
        }
        if !frame_buffer.has_attachments() {
            return Err(RenderError::PreconditionViolation(
                "framebuffer has no attachments".to_string(),
            ));
        }

        let limits = &self.caps.limits;
        let colors = frame_buffer.color_buffers().len();
        if colors > limits.color_attachments as usize {
            return Err(ResourceError::TooManyAttachments {
                limit: "color attachments",
                requested: colors,
                max: limits.color_attachments as usize,
            }
            .into());
        }
        if frame_buffer.is_multi_target() && colors > limits.draw_buffers as usize {
            return Err(ResourceError::TooManyAttachments {
                limit: "draw buffers",
                requested: colors,
                max: limits.draw_buffers as usize,
            }
            .into());
        }
        if !frame_buffer.is_multi_target() && colors > 0 && frame_buffer.target_index() >= colors {
            return Err(RenderError::PreconditionViolation(format!(
                "target index {} is out of range for {colors} color attachments",
                frame_buffer.target_index()
            )));
        }
        if frame_buffer.samples() > 1 && !self.caps.has(Caps::FRAME_BUFFER_MULTISAMPLE) {
            return Err(RenderError::UnsupportedOperation(
                "multisample framebuffers".to_string(),
            ));
        }

        for attachment in frame_buffer.attachments() {
            if attachment.texture().is_some() {
                continue;
            }
            let max = limits.renderbuffer_size;
            if frame_buffer.width() > max || frame_buffer.height() > max {
                return Err(ResourceError::TooLarge {
                    what: "renderbuffer",
                    width: frame_buffer.width(),
                    height: frame_buffer.height(),
                    max,
                }
                .into());
            }
            self.formats.lookup(attachment.format(), false)?;
        }
        Ok(())
    }

    /// Binds `name` to `FRAMEBUFFER`. Returns `true` if the binding changed.
    fn bind_framebuffer_name(&mut self, name: u32) -> bool {
        if self.context.framebuffer == Some(name) {
            return false;
        }
        self.device.bind_framebuffer(gl::FRAMEBUFFER, binding(name));
        self.context.framebuffer = Some(name);
        // Draw and read buffer selection is framebuffer state.
        self.context.draw_buffers = None;
        self.context.read_buffer = None;
        true
    }

    fn select_draw_buffers(&mut self, buffers: Vec<u32>) {
        if self.context.draw_buffers.as_ref() == Some(&buffers) {
            return;
        }
        match buffers.as_slice() {
            [single] => self.device.draw_buffer(*single),
            many => self.device.draw_buffers(many),
        }
        self.context.draw_buffers = Some(buffers);
    }

    fn select_read_buffer(&mut self, buffer: u32) {
        if self.context.read_buffer != Some(buffer) {
            self.device.read_buffer(buffer);
            self.context.read_buffer = Some(buffer);
        }
    }

    fn select_target_buffers(&mut self, frame_buffer: &FrameBuffer) {
        let colors = frame_buffer.color_buffers().len() as u32;
        if colors == 0 {
            self.select_draw_buffers(vec![gl::NONE]);
            self.select_read_buffer(gl::NONE);
        } else if frame_buffer.is_multi_target() {
            let slots = (0..colors).map(|i| gl::COLOR_ATTACHMENT0 + i).collect();
            self.select_draw_buffers(slots);
            self.select_read_buffer(gl::COLOR_ATTACHMENT0);
        } else {
            let slot = gl::COLOR_ATTACHMENT0 + frame_buffer.target_index() as u32;
            self.select_draw_buffers(vec![slot]);
            self.select_read_buffer(slot);
        }
    }

    fn attach(&mut self, frame_buffer: &FrameBuffer, attachment: &RenderBuffer) -> Result<(), RenderError> {
        let point = match attachment.slot() {
            AttachmentSlot::Depth => depth_attachment_point(attachment.format().has_stencil()),
            slot => slot.into_gl(),
        };

        let Some(texture) = attachment.texture() else {
            let format = self.formats.lookup(attachment.format(), false)?;
            let name = match attachment.object().handle() {
                Some(handle) => handle.0,
                None => {
                    let name = self.device.create_renderbuffer().map_err(backend_error)?;
                    self.track(attachment.object(), name);
                    name
                }
            };
            if attachment.object().is_update_needed() {
                if self.context.renderbuffer != Some(name) {
                    self.device.bind_renderbuffer(Some(name));
                    self.context.renderbuffer = Some(name);
                }
                let width = gl_size(frame_buffer.width());
                let height = gl_size(frame_buffer.height());
                if frame_buffer.samples() > 1 {
                    let samples = frame_buffer
                        .samples()
                        .min(self.caps.limits.framebuffer_samples.max(1));
                    self.device.renderbuffer_storage_multisample(
                        gl_size(samples),
                        format.internal_format,
                        width,
                        height,
                    );
                } else {
                    self.device
                        .renderbuffer_storage(format.internal_format, width, height);
                }
                attachment.object().clear_update_needed()?;
            }
            self.device
                .framebuffer_renderbuffer(gl::FRAMEBUFFER, point, Some(name));
            return Ok(());
        };

        // Uploads the image if needed and re-applies its sampling.
        self.bind_texture(0, texture)?;
        let Some(handle) = texture.image().object().handle() else {
            return Err(RenderError::PreconditionViolation(
                "attached texture has no native handle".to_string(),
            ));
        };
        let layer = attachment.layer().unwrap_or(0);
        match texture.texture_type() {
            TextureType::CubeMap => self.device.framebuffer_texture_2d(
                gl::FRAMEBUFFER,
                point,
                gl::TEXTURE_CUBE_MAP_POSITIVE_X + layer as u32,
                Some(handle.0),
                0,
            ),
            TextureType::TwoDimensionalArray | TextureType::ThreeDimensional => {
                self.device.framebuffer_texture_layer(
                    gl::FRAMEBUFFER,
                    point,
                    Some(handle.0),
                    0,
                    gl_size(layer as u32),
                )
            }
            TextureType::TwoDimensional => {
                let target = if texture.image().is_multisampled() {
                    gl::TEXTURE_2D_MULTISAMPLE
                } else {
                    gl::TEXTURE_2D
                };
                self.device.framebuffer_texture_2d(
                    gl::FRAMEBUFFER,
                    point,
                    target,
                    Some(handle.0),
                    0,
                );
            }
        }
        Ok(())
    }

    fn check_frame_buffer_status(&mut self, frame_buffer: &FrameBuffer) -> Result<(), RenderError> {
        let status = self.device.check_framebuffer_status(gl::FRAMEBUFFER);
        if status == gl::FRAMEBUFFER_COMPLETE {
            return Ok(());
        }
        let error = framebuffer_error(status);

        let bound_framebuffer = self.device.get_integer(gl::FRAMEBUFFER_BINDING);
        let bound_renderbuffer = self.device.get_integer(gl::RENDERBUFFER_BINDING);
        let mut dump = format!(
            "Framebuffer {:?} ({}x{}, {} samples)\n  device binding: framebuffer {bound_framebuffer}, renderbuffer {bound_renderbuffer}\n  cached binding: {:?}",
            frame_buffer.object().handle().map(|handle| handle.0),
            frame_buffer.width(),
            frame_buffer.height(),
            frame_buffer.samples(),
            self.context.framebuffer,
        );
        for attachment in frame_buffer.attachments() {
            let source = match attachment.texture() {
                Some(texture) => format!(
                    "{:?} texture {:?}",
                    texture.texture_type(),
                    texture.image().object().handle().map(|handle| handle.0)
                ),
                None => format!(
                    "renderbuffer {:?}",
                    attachment.object().handle().map(|handle| handle.0)
                ),
            };
            dump.push_str(&format!(
                "\n  {:?}: {} as {}",
                attachment.slot(),
                source,
                attachment.format()
            ));
        }
        log::error!("{error}\n{dump}");
        Err(error.into())
    }

    /// Creates and attaches a dirty framebuffer, leaving it bound.
    ///
    /// Returns the native name and whether the binding changed.
    fn upload_frame_buffer(&mut self, frame_buffer: &FrameBuffer) -> Result<(u32, bool), RenderError> {
        let name = match frame_buffer.object().handle() {
            Some(handle) => handle.0,
            None => {
                let name = self.device.create_framebuffer().map_err(backend_error)?;
                self.track(frame_buffer.object(), name);
                name
            }
        };
        let switched = self.bind_framebuffer_name(name);
        if !frame_buffer.object().is_update_needed() {
            self.select_target_buffers(frame_buffer);
            return Ok((name, switched));
        }

        if let Some(depth) = frame_buffer.depth_buffer() {
            self.attach(frame_buffer, depth)?;
        }
        for color in frame_buffer.color_buffers() {
            self.attach(frame_buffer, color)?;
        }
        self.select_target_buffers(frame_buffer);
        self.check_frame_buffer_status(frame_buffer)?;
        frame_buffer.object().clear_update_needed()?;
        Ok((name, switched))
    }

    /// Rebuilds the mip chains of the colour textures of a target being left.
    fn regenerate_mipmaps(&mut self, target: &ActiveTarget) {
        for mip in &target.mip_targets {
            let Some(handle) = mip.image.handle() else {
                continue;
            };
            self.bind_texture_to_unit(0, mip.target, handle.0);
            self.device.generate_mipmap(mip.target);
        }
    }

    /// Returns `true` if the default target, or the override standing in for it, is bound.
    fn on_main_target(&self) -> bool {
        match (&self.active_target, &self.main_override) {
            (None, _) => true,
            (Some(active), Some(main)) => active.id == main.object().id(),
            (Some(_), None) => false,
        }
    }

    pub(super) fn override_main_frame_buffer(
        &mut self,
        frame_buffer: Option<Rc<FrameBuffer>>,
    ) -> Result<(), RenderError> {
        if let Some(main) = &frame_buffer {
            self.validate_frame_buffer(main)?;
        }
        let rebind = self.on_main_target();
        self.main_override = None;
        if rebind {
            self.bind_frame_buffer(frame_buffer.as_deref())?;
        }
        self.main_override = frame_buffer;
        Ok(())
    }

    pub(super) fn bind_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>) -> Result<(), RenderError> {
        let main = self.main_override.clone();
        let frame_buffer = frame_buffer.or(main.as_deref());
        if let Some(frame_buffer) = frame_buffer {
            self.validate_frame_buffer(frame_buffer)?;
        }

        let requested = frame_buffer.map(|fb| fb.object().id());
        match (frame_buffer, &self.active_target) {
            (None, None) if self.context.framebuffer == Some(0) => return Ok(()),
            (Some(fb), Some(active))
                if active.id == fb.object().id()
                    && !fb.object().is_update_needed()
                    && self.context.framebuffer == Some(active.handle) =>
            {
                return Ok(())
            }
            _ => {}
        }

        if let Some(previous) = self.active_target.take() {
            if requested != Some(previous.id) {
                self.regenerate_mipmaps(&previous);
            }
        }

        let Some(frame_buffer) = frame_buffer else {
            let switched = if self.caps.has(Caps::FRAME_BUFFER) {
                let (draw, read) = (self.initial_draw_buffer, self.initial_read_buffer);
                let switched = self.bind_framebuffer_name(0);
                self.select_draw_buffers(vec![draw]);
                self.select_read_buffer(read);
                switched
            } else {
                false
            };
            let (viewport, srgb) = (self.main_viewport, self.main_framebuffer_srgb);
            self.apply_viewport(viewport);
            self.apply_framebuffer_srgb(srgb);
            self.stats.on_framebuffer_use(None, switched);
            return Ok(());
        };

        let (name, switched) = self.upload_frame_buffer(frame_buffer)?;
        self.apply_viewport(full_rect(frame_buffer));
        self.apply_framebuffer_srgb(frame_buffer.is_srgb());

        let mip_targets = frame_buffer
            .color_buffers()
            .iter()
            .filter_map(RenderBuffer::texture)
            .filter(|texture| texture.sampler().min_filter.uses_mipmap_levels())
            .map(|texture| MipTarget {
                image: texture.image().object().downgrade(),
                target: texture.texture_type().into_gl(),
            })
            .collect();
        self.active_target = Some(ActiveTarget {
            id: frame_buffer.object().id(),
            handle: name,
            mip_targets,
        });
        self.stats
            .on_framebuffer_use(Some(NativeHandle(name)), switched);
        Ok(())
    }

    pub(super) fn blit_frame_buffer(
        &mut self,
        src: Option<&FrameBuffer>,
        dst: Option<&FrameBuffer>,
        copy_depth: bool,
    ) -> Result<(), RenderError> {
        if !self.caps.has(Caps::FRAME_BUFFER_BLIT) {
            return Err(RenderError::UnsupportedOperation(
                "framebuffer blit".to_string(),
            ));
        }
        let main = self.main_override.clone();
        let src = src.or(main.as_deref());
        let dst = dst.or(main.as_deref());
        for frame_buffer in [src, dst].into_iter().flatten() {
            self.validate_frame_buffer(frame_buffer)?;
        }

        let previous = self.context.framebuffer.unwrap_or_else(|| {
            self.active_target
                .as_ref()
                .map_or(0, |target| target.handle)
        });

        let mut names = [0u32; 2];
        for (slot, frame_buffer) in [src, dst].into_iter().enumerate() {
            if let Some(frame_buffer) = frame_buffer {
                names[slot] = self.upload_frame_buffer(frame_buffer)?.0;
            }
        }

        let src_rect = src.map_or(self.main_viewport, full_rect);
        let dst_rect = dst.map_or(self.main_viewport, full_rect);
        let mut mask = gl::COLOR_BUFFER_BIT;
        if copy_depth {
            mask |= gl::DEPTH_BUFFER_BIT;
        }

        self.device
            .bind_framebuffer(gl::READ_FRAMEBUFFER, binding(names[0]));
        self.device
            .bind_framebuffer(gl::DRAW_FRAMEBUFFER, binding(names[1]));
        self.device
            .blit_framebuffer(corners(src_rect), corners(dst_rect), mask, gl::NEAREST);

        self.device.bind_framebuffer(gl::FRAMEBUFFER, binding(previous));
        self.context.framebuffer = Some(previous);
        self.context.draw_buffers = None;
        self.context.read_buffer = None;
        Ok(())
    }

    pub(super) fn read_pixels(
        &mut self,
        frame_buffer: Option<&FrameBuffer>,
        out: &mut [u8],
    ) -> Result<(), RenderError> {
        let main = self.main_override.clone();
        let frame_buffer = frame_buffer.or(main.as_deref());
        if frame_buffer.is_some_and(|fb| fb.color_buffers().is_empty()) {
            return Err(RenderError::PreconditionViolation(
                "framebuffer has no color attachment to read".to_string(),
            ));
        }
        let rect = frame_buffer.map_or(self.main_viewport, full_rect);
        let needed = rect.width as usize * rect.height as usize * 4;
        if out.len() < needed {
            return Err(RenderError::PreconditionViolation(format!(
                "read buffer holds {} bytes, {needed} needed",
                out.len()
            )));
        }

        self.bind_frame_buffer(frame_buffer)?;
        if frame_buffer.is_some() {
            self.select_read_buffer(gl::COLOR_ATTACHMENT0);
        }
        self.device.read_pixels(
            rect.x,
            rect.y,
            gl_size(rect.width),
            gl_size(rect.height),
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            &mut out[..needed],
        );
        Ok(())
    }

    pub(super) fn delete_target(&mut self, frame_buffer: &FrameBuffer) {
        let is_active = self
            .active_target
            .as_ref()
            .is_some_and(|target| target.id == frame_buffer.object().id());
        if self
            .main_override
            .as_ref()
            .is_some_and(|main| main.object().id() == frame_buffer.object().id())
        {
            self.main_override = None;
        }
        if is_active {
            if let Err(err) = self.bind_frame_buffer(None) {
                log::warn!("Failed to restore the default target before deletion: {err}");
            }
        }
        for attachment in frame_buffer.attachments() {
            if attachment.object().is_allocated() {
                self.delete_object(attachment.object());
            }
        }
        self.delete_object(frame_buffer.object());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_errors() {
        assert_eq!(
            framebuffer_error(gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT),
            FramebufferError::MissingAttachment
        );
        assert_eq!(
            framebuffer_error(gl::FRAMEBUFFER_UNSUPPORTED),
            FramebufferError::UnsupportedFormatCombination
        );
        assert_eq!(framebuffer_error(0x1234), FramebufferError::Unknown(0x1234));
    }

    #[test]
    fn blit_corners_are_exclusive() {
        assert_eq!(corners(Rect::new(0, 0, 640, 480)), [0, 0, 640, 480]);
        assert_eq!(corners(Rect::new(10, 20, 5, 5)), [10, 20, 15, 25]);
    }
}
