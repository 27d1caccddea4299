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

//! Integration tests for offscreen targets: validation, binding, mip
//! regeneration, blits and read-back.

mod common;

use glint_core::math::Rect;
use glint_core::renderer::api::{FrameBuffer, Image, ImageFormat, MinFilter, Texture};
use glint_core::renderer::{FramebufferError, RenderError, ResourceError};
use glint_core::Renderer;
use glint_infra::graphics::gl::enums as gl;
use glint_infra::{GlCall, RecordingDevice};
use std::rc::Rc;

fn color_target(width: u32, height: u32) -> FrameBuffer {
    let mut frame_buffer = FrameBuffer::new(width, height, 1);
    frame_buffer.set_depth_buffer(ImageFormat::Depth24);
    frame_buffer.add_color_buffer(ImageFormat::RGBA8);
    frame_buffer
}

fn mipmapped_texture_target(size: u32) -> (FrameBuffer, Texture) {
    let mut texture = Texture::new_2d(Image::empty(ImageFormat::RGBA8, size, size));
    texture.set_min_filter(MinFilter::Trilinear);
    let mut frame_buffer = FrameBuffer::new(size, size, 1);
    frame_buffer.set_depth_buffer(ImageFormat::Depth24);
    frame_buffer.set_color_texture(texture.clone());
    (frame_buffer, texture)
}

fn generate_mipmap_calls(renderer: &glint_infra::GlRenderer<RecordingDevice>) -> usize {
    renderer
        .device()
        .count(|call| matches!(call, GlCall::GenerateMipmap(_)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_too_many_color_attachments_fail_before_any_native_call() {
    let mut renderer = common::renderer();
    let mut frame_buffer = FrameBuffer::new(64, 64, 1);
    for _ in 0..9 {
        frame_buffer.add_color_buffer(ImageFormat::RGBA8);
    }

    let err = renderer.set_frame_buffer(Some(&frame_buffer)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ResourceError(ResourceError::TooManyAttachments {
            requested: 9,
            max: 8,
            ..
        })
    ));
    assert!(renderer.device().calls().is_empty());
    assert!(frame_buffer.object().handle().is_none());
}

#[test]
fn test_multi_target_is_bounded_by_draw_buffers() {
    let mut device = RecordingDevice::new();
    device.set_integer(gl::MAX_DRAW_BUFFERS, 2);
    let mut renderer = common::renderer_with(device, Default::default());
    let mut frame_buffer = FrameBuffer::new(64, 64, 1);
    for _ in 0..3 {
        frame_buffer.add_color_buffer(ImageFormat::RGBA8);
    }
    frame_buffer.set_multi_target(true);

    let err = renderer.set_frame_buffer(Some(&frame_buffer)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ResourceError(ResourceError::TooManyAttachments {
            limit: "draw buffers",
            requested: 3,
            max: 2,
        })
    ));
    assert!(renderer.device().calls().is_empty());
    assert!(frame_buffer.object().handle().is_none());
}

#[test]
fn test_oversized_renderbuffers_fail_before_any_native_call() {
    let mut renderer = common::renderer();
    let frame_buffer = color_target(8192, 8192);
    assert!(matches!(
        renderer.set_frame_buffer(Some(&frame_buffer)),
        Err(RenderError::ResourceError(ResourceError::TooLarge {
            what: "renderbuffer",
            ..
        }))
    ));
    assert!(renderer.device().calls().is_empty());
}

#[test]
fn test_framebuffers_need_the_capability() {
    let mut renderer = common::renderer_with(RecordingDevice::gl21(), Default::default());
    let frame_buffer = color_target(16, 16);
    assert!(matches!(
        renderer.set_frame_buffer(Some(&frame_buffer)),
        Err(RenderError::UnsupportedOperation(_))
    ));
    assert!(renderer.device().calls().is_empty());
}

#[test]
fn test_incomplete_framebuffers_are_reported() {
    let mut renderer = common::renderer();
    renderer.device_mut().framebuffer_status = gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT;
    let frame_buffer = color_target(16, 16);
    assert!(matches!(
        renderer.set_frame_buffer(Some(&frame_buffer)),
        Err(RenderError::ResourceError(ResourceError::IncompleteFramebuffer(
            FramebufferError::MissingAttachment
        )))
    ));
    assert!(frame_buffer.object().is_update_needed());
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_binding_is_idempotent() {
    let mut renderer = common::renderer();
    let frame_buffer = color_target(32, 32);
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    assert!(renderer.device().calls().contains(&GlCall::Viewport(0, 0, 32, 32)));

    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    assert!(renderer.device().calls().is_empty());
}

#[test]
fn test_default_target_restores_the_main_viewport() {
    let mut renderer = common::renderer();
    renderer.set_viewport(Rect::new(0, 0, 800, 600));
    let frame_buffer = color_target(32, 32);
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();

    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(None).unwrap();
    let calls = renderer.device().calls();
    assert!(calls.contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, None)));
    assert!(calls.contains(&GlCall::DrawBuffer(gl::BACK)));
    assert!(calls.contains(&GlCall::Viewport(0, 0, 800, 600)));
}

#[test]
fn test_multi_target_selects_every_color_attachment() {
    let mut renderer = common::renderer();
    let mut frame_buffer = FrameBuffer::new(16, 16, 1);
    frame_buffer.add_color_buffer(ImageFormat::RGBA8);
    frame_buffer.add_color_buffer(ImageFormat::RGBA8);
    frame_buffer.set_multi_target(true);

    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    assert!(renderer.device().calls().contains(&GlCall::DrawBuffers(vec![
        gl::COLOR_ATTACHMENT0,
        gl::COLOR_ATTACHMENT0 + 1,
    ])));
}

// ─────────────────────────────────────────────────────────────────────────────
// Mipmap regeneration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_leaving_a_target_regenerates_mipmaps_once() {
    let mut renderer = common::renderer();
    let (frame_buffer, _texture) = mipmapped_texture_target(64);
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    renderer.device_mut().clear_calls();

    renderer.set_frame_buffer(None).unwrap();
    assert_eq!(generate_mipmap_calls(&renderer), 1);

    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(None).unwrap();
    assert_eq!(generate_mipmap_calls(&renderer), 0);
}

#[test]
fn test_rebinding_the_same_target_does_not_regenerate() {
    let mut renderer = common::renderer();
    let (frame_buffer, _texture) = mipmapped_texture_target(64);
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    renderer.device_mut().clear_calls();

    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    assert_eq!(generate_mipmap_calls(&renderer), 0);
}

#[test]
fn test_rendered_contents_survive_a_filter_change() {
    let mut renderer = common::renderer();
    let texture = Texture::new_2d(Image::empty(ImageFormat::RGBA8, 16, 16));
    let mut frame_buffer = FrameBuffer::new(16, 16, 1);
    frame_buffer.set_color_texture(texture.clone());
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    renderer.set_frame_buffer(None).unwrap();

    let mut view = texture.clone();
    view.set_min_filter(MinFilter::Trilinear);
    assert!(!view.image().object().is_update_needed());

    renderer.device_mut().clear_calls();
    renderer.set_texture(0, &view).unwrap();
    assert!(
        !renderer
            .device()
            .calls()
            .iter()
            .any(|call| matches!(call, GlCall::TexImage2D { .. })),
        "the target image must not be specified again: {:?}",
        renderer.device().calls()
    );
}

#[test]
fn test_targets_without_mip_filters_skip_regeneration() {
    let mut renderer = common::renderer();
    let mut texture = Texture::new_2d(Image::empty(ImageFormat::RGBA8, 32, 32));
    texture.set_min_filter(MinFilter::BilinearNoMipMaps);
    let mut frame_buffer = FrameBuffer::new(32, 32, 1);
    frame_buffer.set_color_texture(texture);

    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(None).unwrap();
    assert_eq!(generate_mipmap_calls(&renderer), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Main target override
// ─────────────────────────────────────────────────────────────────────────────

fn main_override(renderer: &mut glint_infra::GlRenderer<RecordingDevice>) -> (Rc<FrameBuffer>, u32) {
    let main = Rc::new(color_target(4, 4));
    renderer
        .set_main_frame_buffer_override(Some(Rc::clone(&main)))
        .unwrap();
    let name = main.object().handle().map(|handle| handle.0).unwrap();
    (main, name)
}

#[test]
fn test_override_is_bound_when_the_default_target_is_active() {
    let mut renderer = common::renderer();
    renderer.set_frame_buffer(None).unwrap();
    let (_main, name) = main_override(&mut renderer);
    assert!(renderer
        .device()
        .calls()
        .contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, Some(name))));

    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(None).unwrap();
    assert!(
        renderer.device().calls().is_empty(),
        "the override is already bound: {:?}",
        renderer.device().calls()
    );
}

#[test]
fn test_default_binding_goes_to_the_override() {
    let mut renderer = common::renderer();
    let (_main, name) = main_override(&mut renderer);
    let other = color_target(8, 8);
    renderer.set_frame_buffer(Some(&other)).unwrap();

    renderer.device_mut().clear_calls();
    renderer.set_frame_buffer(None).unwrap();
    let calls = renderer.device().calls();
    assert!(calls.contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, Some(name))));
    assert!(calls.contains(&GlCall::Viewport(0, 0, 4, 4)));
    assert!(!calls.contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, None)));
}

#[test]
fn test_clearing_the_override_restores_the_device_target() {
    let mut renderer = common::renderer();
    let (_main, _name) = main_override(&mut renderer);
    renderer.device_mut().clear_calls();

    renderer.set_main_frame_buffer_override(None).unwrap();
    assert!(renderer
        .device()
        .calls()
        .contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, None)));
    assert!(renderer.main_frame_buffer_override().is_none());
}

#[test]
fn test_blit_and_read_back_use_the_override() {
    let mut renderer = common::renderer();
    renderer.set_viewport(Rect::new(0, 0, 800, 600));
    let (_main, _name) = main_override(&mut renderer);

    // The override is 4x4, the device target would need 800x600x4 bytes.
    let mut pixels = vec![0u8; 4 * 4 * 4];
    renderer.read_frame_buffer(None, &mut pixels).unwrap();
    assert!(pixels.iter().all(|&byte| byte == 0x7F));

    let target = color_target(16, 16);
    renderer.device_mut().clear_calls();
    renderer.copy_frame_buffer(None, Some(&target), false).unwrap();
    assert!(renderer.device().calls().contains(&GlCall::BlitFramebuffer {
        src: [0, 0, 4, 4],
        dst: [0, 0, 16, 16],
        mask: gl::COLOR_BUFFER_BIT,
        filter: gl::NEAREST,
    }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Blit and read-back
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_blit_restores_the_previous_binding() {
    let mut renderer = common::renderer();
    renderer.set_viewport(Rect::new(0, 0, 320, 240));
    let frame_buffer = color_target(64, 32);
    renderer.set_frame_buffer(None).unwrap();
    renderer.device_mut().clear_calls();

    renderer
        .copy_frame_buffer(Some(&frame_buffer), None, true)
        .unwrap();
    let calls = renderer.device().calls();
    assert!(calls.contains(&GlCall::BlitFramebuffer {
        src: [0, 0, 64, 32],
        dst: [0, 0, 320, 240],
        mask: gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT,
        filter: gl::NEAREST,
    }));
    assert_eq!(
        calls.last(),
        Some(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, None))
    );
}

#[test]
fn test_blit_needs_the_capability() {
    let mut device = RecordingDevice::gl21();
    device.add_extension("GL_EXT_framebuffer_object");
    let mut renderer = common::renderer_with(device, Default::default());
    let frame_buffer = color_target(16, 16);

    assert!(matches!(
        renderer.copy_frame_buffer(Some(&frame_buffer), None, false),
        Err(RenderError::UnsupportedOperation(_))
    ));
    assert!(renderer.device().calls().is_empty());
    assert!(frame_buffer.object().handle().is_none());
}

#[test]
fn test_read_back_fills_the_output() {
    let mut renderer = common::renderer();
    let frame_buffer = color_target(4, 4);
    let mut pixels = vec![0u8; 4 * 4 * 4];
    renderer
        .read_frame_buffer(Some(&frame_buffer), &mut pixels)
        .unwrap();
    assert!(pixels.iter().all(|&byte| byte == 0x7F));

    let mut short = vec![0u8; 8];
    assert!(matches!(
        renderer.read_frame_buffer(Some(&frame_buffer), &mut short),
        Err(RenderError::PreconditionViolation(_))
    ));
}

#[test]
fn test_deleting_the_active_target_returns_to_the_default() {
    let mut renderer = common::renderer();
    let frame_buffer = color_target(16, 16);
    renderer.set_frame_buffer(Some(&frame_buffer)).unwrap();
    let live = renderer.device().live_objects();

    renderer.delete_frame_buffer(&frame_buffer);
    assert!(renderer
        .device()
        .calls()
        .contains(&GlCall::BindFramebuffer(gl::FRAMEBUFFER, None)));
    // The framebuffer and its two renderbuffers.
    assert_eq!(renderer.device().live_objects(), live - 3);
    assert_eq!(renderer.device().double_deletes(), 0);
    assert!(frame_buffer.object().handle().is_none());
}
