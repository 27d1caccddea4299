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

//! Defines offscreen render targets.

use super::image::ImageFormat;
use super::object::{GpuObject, NativeKind};
use super::texture::Texture;

/// Where a render buffer is attached inside its framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentSlot {
    /// The depth (or depth/stencil) attachment.
    Depth,
    /// A colour attachment, by index.
    Color(u8),
}

/// One attachment of a framebuffer.
///
/// A render buffer is either backed by a plain native renderbuffer (which can
/// only be rendered into) or by a texture (which can also be sampled). A
/// texture-backed attachment may target one cube face or array layer.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    format: ImageFormat,
    slot: AttachmentSlot,
    texture: Option<Texture>,
    layer: Option<usize>,
    object: GpuObject,
}

impl RenderBuffer {
    fn plain(format: ImageFormat, slot: AttachmentSlot) -> Self {
        Self {
            format,
            slot,
            texture: None,
            layer: None,
            object: GpuObject::new(NativeKind::RenderBuffer),
        }
    }

    fn textured(texture: Texture, slot: AttachmentSlot, layer: Option<usize>) -> Self {
        let format = texture.image().format();
        Self {
            format,
            slot,
            texture: Some(texture),
            layer,
            object: GpuObject::new(NativeKind::RenderBuffer),
        }
    }

    /// The pixel format of the attachment.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The attachment point.
    pub fn slot(&self) -> AttachmentSlot {
        self.slot
    }

    /// The backing texture, if any.
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// The cube face or array layer rendered into, for texture-backed attachments.
    pub fn layer(&self) -> Option<usize> {
        self.layer
    }

    /// The GPU bookkeeping of the plain renderbuffer.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

/// An offscreen render target with an optional depth attachment and any number
/// of colour attachments.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    samples: u32,
    depth: Option<RenderBuffer>,
    colors: Vec<RenderBuffer>,
    multi_target: bool,
    target_index: usize,
    srgb: bool,
    object: GpuObject,
}

impl FrameBuffer {
    /// Creates an empty framebuffer. Attach at least one buffer before binding it.
    pub fn new(width: u32, height: u32, samples: u32) -> Self {
        Self {
            width,
            height,
            samples: samples.max(1),
            depth: None,
            colors: Vec::new(),
            multi_target: false,
            target_index: 0,
            srgb: false,
            object: GpuObject::new(NativeKind::FrameBuffer),
        }
    }

    /// Attaches a plain depth renderbuffer.
    pub fn set_depth_buffer(&mut self, format: ImageFormat) {
        self.depth = Some(RenderBuffer::plain(format, AttachmentSlot::Depth));
        self.object.set_update_needed();
    }

    /// Attaches a depth texture.
    pub fn set_depth_texture(&mut self, texture: Texture) {
        self.depth = Some(RenderBuffer::textured(texture, AttachmentSlot::Depth, None));
        self.object.set_update_needed();
    }

    /// Appends a plain colour renderbuffer.
    pub fn add_color_buffer(&mut self, format: ImageFormat) {
        let slot = self.next_color_slot();
        self.colors.push(RenderBuffer::plain(format, slot));
        self.object.set_update_needed();
    }

    /// Appends a colour texture.
    pub fn add_color_texture(&mut self, texture: Texture) {
        let slot = self.next_color_slot();
        self.colors.push(RenderBuffer::textured(texture, slot, None));
        self.object.set_update_needed();
    }

    /// Appends one face of a cube map, or one layer of an array texture.
    pub fn add_color_texture_layer(&mut self, texture: Texture, layer: usize) {
        let slot = self.next_color_slot();
        self.colors
            .push(RenderBuffer::textured(texture, slot, Some(layer)));
        self.object.set_update_needed();
    }

    /// Replaces the colour attachments with a single texture.
    pub fn set_color_texture(&mut self, texture: Texture) {
        self.colors.clear();
        self.add_color_texture(texture);
    }

    /// Removes every colour attachment.
    pub fn clear_color_targets(&mut self) {
        self.colors.clear();
        self.object.set_update_needed();
    }

    fn next_color_slot(&self) -> AttachmentSlot {
        AttachmentSlot::Color(self.colors.len().min(u8::MAX as usize) as u8)
    }

    /// Renders into every colour attachment at once instead of only the target index.
    pub fn set_multi_target(&mut self, enabled: bool) {
        self.multi_target = enabled;
        self.object.set_update_needed();
    }

    /// Selects the single colour attachment rendered into when not multi-target.
    pub fn set_target_index(&mut self, index: usize) {
        if index != self.target_index {
            self.target_index = index;
            self.object.set_update_needed();
        }
    }

    /// Requests sRGB encoding of writes to this target.
    pub fn set_srgb(&mut self, srgb: bool) {
        self.srgb = srgb;
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample count, 1 when not multisampled.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// The depth attachment.
    pub fn depth_buffer(&self) -> Option<&RenderBuffer> {
        self.depth.as_ref()
    }

    /// The colour attachments, in slot order.
    pub fn color_buffers(&self) -> &[RenderBuffer] {
        &self.colors
    }

    /// One colour attachment.
    pub fn color_buffer(&self, index: usize) -> Option<&RenderBuffer> {
        self.colors.get(index)
    }

    /// Returns `true` if every colour attachment is rendered into at once.
    pub fn is_multi_target(&self) -> bool {
        self.multi_target
    }

    /// The selected colour attachment when not multi-target.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Returns `true` if writes are sRGB encoded.
    pub fn is_srgb(&self) -> bool {
        self.srgb
    }

    /// Returns `true` if at least one buffer is attached.
    pub fn has_attachments(&self) -> bool {
        self.depth.is_some() || !self.colors.is_empty()
    }

    /// Iterates over every attachment, depth first.
    pub fn attachments(&self) -> impl Iterator<Item = &RenderBuffer> {
        self.depth.iter().chain(self.colors.iter())
    }

    /// The GPU bookkeeping of the framebuffer.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::image::Image;

    #[test]
    fn slots_follow_insertion_order() {
        let mut fb = FrameBuffer::new(64, 64, 1);
        assert!(!fb.has_attachments());
        fb.set_depth_buffer(ImageFormat::Depth24);
        fb.add_color_buffer(ImageFormat::RGBA8);
        fb.add_color_texture(Texture::new_2d(Image::empty(ImageFormat::RGBA16F, 64, 64)));
        assert!(fb.has_attachments());
        let slots: Vec<_> = fb.attachments().map(RenderBuffer::slot).collect();
        assert_eq!(
            slots,
            vec![
                AttachmentSlot::Depth,
                AttachmentSlot::Color(0),
                AttachmentSlot::Color(1)
            ]
        );
        assert_eq!(fb.color_buffer(1).unwrap().format(), ImageFormat::RGBA16F);
        assert!(fb.color_buffer(1).unwrap().texture().is_some());
    }

    #[test]
    fn target_index_only_dirties_on_change() {
        let mut fb = FrameBuffer::new(8, 8, 0);
        assert_eq!(fb.samples(), 1);
        fb.object().set_handle(crate::renderer::api::NativeHandle(2));
        fb.object().clear_update_needed().unwrap();
        fb.set_target_index(0);
        assert!(!fb.object().is_update_needed());
        fb.set_target_index(1);
        assert!(fb.object().is_update_needed());
    }
}
