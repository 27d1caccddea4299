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

//! Integration tests for native object reclamation and context loss.

mod common;

use glint_core::renderer::api::{Image, ImageFormat, RendererConfig, Texture};
use glint_core::Renderer;
use glint_infra::{GlCall, RecordingDevice};

fn buffer_deletes(renderer: &glint_infra::GlRenderer<RecordingDevice>) -> usize {
    renderer
        .device()
        .count(|call| matches!(call, GlCall::DeleteBuffer(_)))
}

#[test]
fn test_dropped_descriptors_are_deleted_at_end_of_frame() {
    let mut renderer = common::renderer();
    {
        let buffer = common::positions(3);
        renderer.update_buffer_data(&buffer).unwrap();
        assert_eq!(renderer.registered_objects(), 1);
    }
    assert_eq!(buffer_deletes(&renderer), 0, "nothing is deleted before the frame ends");

    renderer.on_frame();
    assert_eq!(buffer_deletes(&renderer), 1);
    assert_eq!(renderer.registered_objects(), 0);
    assert_eq!(renderer.device().live_objects(), 0);
}

#[test]
fn test_reclamation_respects_the_frame_budget() {
    let config = RendererConfig {
        max_reclaims_per_frame: 2,
        ..RendererConfig::default()
    };
    let mut renderer = common::renderer_with(RecordingDevice::new(), config);
    for _ in 0..5 {
        let buffer = common::positions(3);
        renderer.update_buffer_data(&buffer).unwrap();
    }

    let mut per_frame = Vec::new();
    for _ in 0..4 {
        renderer.device_mut().clear_calls();
        renderer.on_frame();
        per_frame.push(buffer_deletes(&renderer));
    }
    assert_eq!(per_frame, vec![2, 2, 1, 0]);
}

#[test]
fn test_explicit_deletion_is_not_repeated() {
    let mut renderer = common::renderer();
    {
        let buffer = common::positions(3);
        renderer.update_buffer_data(&buffer).unwrap();
        renderer.delete_buffer(&buffer);
        assert!(buffer.object().handle().is_none());
        assert!(buffer.object().is_update_needed());
    }
    renderer.on_frame();
    assert_eq!(buffer_deletes(&renderer), 1);
    assert_eq!(renderer.device().double_deletes(), 0);
}

#[test]
fn test_live_descriptors_survive_the_sweep() {
    let mut renderer = common::renderer();
    let buffer = common::positions(3);
    renderer.update_buffer_data(&buffer).unwrap();
    renderer.on_frame();
    assert_eq!(buffer_deletes(&renderer), 0);
    assert!(buffer.object().handle().is_some());
}

#[test]
fn test_shared_images_are_reclaimed_with_their_last_view() {
    let mut renderer = common::renderer();
    let texture = Texture::new_2d(Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 16]));
    let view = texture.clone();
    renderer.upload_texture(&texture).unwrap();

    drop(texture);
    renderer.on_frame();
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::DeleteTexture(_))),
        0,
        "the image is still referenced by another view"
    );

    drop(view);
    renderer.on_frame();
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::DeleteTexture(_))),
        1
    );
}

#[test]
fn test_reset_forgets_objects_without_deleting_them() {
    let mut renderer = common::renderer();
    let texture = Texture::new_2d(Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 16]));
    renderer.upload_texture(&texture).unwrap();
    let old = texture.image().object().handle();

    renderer.reset_gl_objects();
    assert!(texture.image().object().handle().is_none());
    assert!(texture.image().object().is_update_needed());
    assert_eq!(renderer.registered_objects(), 0);
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::DeleteTexture(_))),
        0
    );

    renderer.upload_texture(&texture).unwrap();
    assert!(texture.image().object().handle().is_some());
    assert_ne!(texture.image().object().handle(), old);
}

#[test]
fn test_cleanup_deletes_every_native_object() {
    let mut renderer = common::renderer();
    let buffer = common::positions(3);
    let texture = Texture::new_2d(Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 16]));
    let mut shader = common::color_shader();
    renderer.update_buffer_data(&buffer).unwrap();
    renderer.upload_texture(&texture).unwrap();
    renderer.set_shader(&mut shader).unwrap();
    assert!(renderer.device().live_objects() > 0);

    renderer.cleanup();
    assert_eq!(renderer.device().live_objects(), 0);
    assert_eq!(renderer.device().double_deletes(), 0);
    assert!(buffer.object().handle().is_none());
    assert!(shader.object().handle().is_none());
}

#[test]
fn test_deleting_a_shader_releases_its_sources() {
    let mut renderer = common::renderer();
    let mut shader = common::color_shader();
    renderer.set_shader(&mut shader).unwrap();
    renderer.device_mut().clear_calls();

    renderer.delete_shader(&shader);
    let device = renderer.device();
    assert_eq!(device.count(|call| matches!(call, GlCall::DetachShader(..))), 2);
    assert_eq!(device.count(|call| matches!(call, GlCall::DeleteShader(_))), 2);
    assert_eq!(device.count(|call| matches!(call, GlCall::DeleteProgram(_))), 1);
    assert_eq!(device.live_objects(), 0);
    assert_eq!(renderer.registered_objects(), 0);
    assert!(shader.object().handle().is_none());
    assert!(shader.sources().iter().all(|s| s.object().handle().is_none()));
}

#[test]
fn test_deleting_an_unallocated_resource_only_warns() {
    common::init_logging();
    let mut renderer = common::renderer();
    let texture = Texture::new_2d(Image::new_2d(ImageFormat::RGBA8, 2, 2, vec![0; 16]));
    renderer.upload_texture(&texture).unwrap();
    renderer.delete_image(&texture.image());
    assert!(texture.image().object().handle().is_none());

    let before = common::warnings();
    renderer.delete_image(&texture.image());
    assert_eq!(common::warnings(), before + 1);
    assert_eq!(renderer.device().double_deletes(), 0);
}
