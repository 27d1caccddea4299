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

//! Integration tests for the device state cache.
//!
//! Every native state call must be issued at most once for a given value, and
//! only again after the cached state has been invalidated.

mod common;

use approx::assert_relative_eq;
use glint_core::math::{LinearRgba, Rect};
use glint_core::renderer::api::{BlendMode, FaceCullMode, RenderState, RendererConfig, TestFunction};
use glint_core::Renderer;
use glint_infra::{GlCall, RecordingDevice};

fn state_calls(renderer: &glint_infra::GlRenderer<RecordingDevice>) -> usize {
    renderer.device().count(GlCall::is_state_change)
}

// ─────────────────────────────────────────────────────────────────────────────
// Render state diffing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_applying_the_same_state_twice_is_free() {
    let mut renderer = common::renderer();
    let state = RenderState::transparent();

    renderer.apply_render_state(&state);
    assert!(state_calls(&renderer) > 0, "the first application must reach the device");

    renderer.device_mut().clear_calls();
    renderer.apply_render_state(&state);
    assert!(
        renderer.device().calls().is_empty(),
        "a repeated state must not issue any call, got {:?}",
        renderer.device().calls()
    );
}

#[test]
fn test_only_changed_fields_are_sent() {
    let mut renderer = common::renderer();
    renderer.apply_render_state(&RenderState::default());
    renderer.device_mut().clear_calls();

    let state = RenderState {
        depth_func: TestFunction::Less,
        ..RenderState::default()
    };
    renderer.apply_render_state(&state);
    assert_eq!(renderer.device().calls(), &[GlCall::DepthFunc(glint_infra::graphics::gl::enums::LESS)]);
}

#[test]
fn test_depth_function_is_ignored_while_depth_test_is_off() {
    let mut renderer = common::renderer();
    let state = RenderState {
        depth_test: false,
        depth_func: TestFunction::Greater,
        ..RenderState::default()
    };
    renderer.apply_render_state(&state);
    assert_eq!(
        renderer.device().count(|call| matches!(call, GlCall::DepthFunc(_))),
        0
    );
}

#[test]
fn test_switching_blend_modes_keeps_blending_enabled() {
    let mut renderer = common::renderer();
    let additive = RenderState {
        blend_mode: BlendMode::Additive,
        cull_mode: FaceCullMode::Off,
        ..RenderState::default()
    };
    renderer.apply_render_state(&additive);
    renderer.device_mut().clear_calls();

    renderer.apply_render_state(&RenderState {
        blend_mode: BlendMode::Alpha,
        ..additive
    });
    let calls = renderer.device().calls();
    assert_eq!(calls.len(), 1, "only the blend function changes: {calls:?}");
    assert!(matches!(calls[0], GlCall::BlendFunc(..)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Standalone setters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clear_color_and_depth_range_are_cached() {
    let mut renderer = common::renderer();
    let color = LinearRgba {
        r: 0.25,
        g: 0.5,
        b: 0.75,
        a: 1.0,
    };
    renderer.set_background_color(color);
    renderer.set_background_color(color);
    renderer.set_depth_range(0.1, 0.9);
    renderer.set_depth_range(0.1, 0.9);

    let calls = renderer.device().calls();
    assert_eq!(calls.len(), 2);
    match calls[0] {
        GlCall::ClearColor(r, g, b, a) => {
            assert_relative_eq!(r, 0.25);
            assert_relative_eq!(g, 0.5);
            assert_relative_eq!(b, 0.75);
            assert_relative_eq!(a, 1.0);
        }
        ref other => panic!("expected a clear color call, got {other:?}"),
    }
    match calls[1] {
        GlCall::DepthRange(near, far) => {
            assert_relative_eq!(near, 0.1);
            assert_relative_eq!(far, 0.9);
        }
        ref other => panic!("expected a depth range call, got {other:?}"),
    }
}

#[test]
fn test_viewport_is_cached() {
    let mut renderer = common::renderer();
    let rect = Rect::new(0, 0, 640, 480);
    renderer.set_viewport(rect);
    renderer.set_viewport(rect);
    assert_eq!(renderer.device().calls(), &[GlCall::Viewport(0, 0, 640, 480)]);
    assert_eq!(renderer.main_viewport(), rect);
}

#[test]
fn test_clip_rect_enables_and_disables_the_scissor() {
    let mut renderer = common::renderer();
    renderer.set_clip_rect(Rect::new(10, 10, 100, 50));
    renderer.clear_clip_rect();
    let scissor = glint_infra::graphics::gl::enums::SCISSOR_TEST;
    assert_eq!(
        renderer.device().calls(),
        &[
            GlCall::Enable(scissor),
            GlCall::Scissor(10, 10, 100, 50),
            GlCall::Disable(scissor),
        ]
    );
}

#[test]
fn test_alpha_to_coverage_without_multisampling_warns() {
    let mut renderer = common::renderer();
    let before = common::warnings();
    renderer.set_alpha_to_coverage(true);
    assert_eq!(common::warnings(), before + 1);
    assert!(renderer.device().calls().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalidation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_invalidated_state_is_sent_again() {
    let mut renderer = common::renderer();
    let state = RenderState::default();
    renderer.apply_render_state(&state);
    let first = state_calls(&renderer);

    renderer.invalidate_state();
    renderer.device_mut().clear_calls();
    renderer.apply_render_state(&state);
    assert_eq!(state_calls(&renderer), first);
}

#[test]
fn test_srgb_main_framebuffer_from_config() {
    let config = RendererConfig {
        main_framebuffer_srgb: true,
        ..RendererConfig::default()
    };
    let mut renderer = common::renderer_with(RecordingDevice::new(), config);
    // Already enabled during initialization.
    renderer.set_main_frame_buffer_srgb(true);
    assert!(renderer.device().calls().is_empty());

    renderer.set_main_frame_buffer_srgb(false);
    assert_eq!(
        renderer.device().calls(),
        &[GlCall::Disable(glint_infra::graphics::gl::enums::FRAMEBUFFER_SRGB)]
    );
}
