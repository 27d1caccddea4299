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

//! Fixed-function state, diffed field by field against the [`RenderContext`].
//!
//! [`RenderContext`]: crate::graphics::gl::context::RenderContext

use super::{gl_size, GlRenderer};
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::device::GlDevice;
use crate::graphics::gl::enums as gl;
use glint_core::math::{LinearRgba, Rect};
use glint_core::renderer::api::{Caps, Mode, RenderState, StencilFace};

/// Enables or disables `cap` if the cached toggle differs.
fn set_capability<D: GlDevice>(device: &mut D, cached: &mut Option<bool>, cap: u32, enabled: bool) {
    if *cached == Some(enabled) {
        return;
    }
    if enabled {
        device.enable(cap);
    } else {
        device.disable(cap);
    }
    *cached = Some(enabled);
}

fn stencil_ops(face: &StencilFace) -> (u32, u32, u32) {
    (
        face.fail_op.into_gl(),
        face.depth_fail_op.into_gl(),
        face.depth_pass_op.into_gl(),
    )
}

impl<D: GlDevice> GlRenderer<D> {
    pub(super) fn apply_state(&mut self, state: &RenderState) {
        let device = &mut self.device;
        let ctx = &mut self.context;

        if ctx.wireframe != Some(state.wireframe) {
            let mode = if state.wireframe { gl::LINE } else { gl::FILL };
            device.polygon_mode(gl::FRONT_AND_BACK, mode);
            ctx.wireframe = Some(state.wireframe);
        }

        // --- Depth ---
        set_capability(device, &mut ctx.depth_test, gl::DEPTH_TEST, state.depth_test);
        if state.depth_test {
            let func = state.depth_func.into_gl();
            if ctx.depth_func != Some(func) {
                device.depth_func(func);
                ctx.depth_func = Some(func);
            }
        }
        if ctx.depth_write != Some(state.depth_write) {
            device.depth_mask(state.depth_write);
            ctx.depth_write = Some(state.depth_write);
        }
        if ctx.color_write != Some(state.color_write) {
            let on = state.color_write;
            device.color_mask(on, on, on, on);
            ctx.color_write = Some(on);
        }

        // --- Polygon offset ---
        set_capability(
            device,
            &mut ctx.polygon_offset_enabled,
            gl::POLYGON_OFFSET_FILL,
            state.polygon_offset_enabled,
        );
        if state.polygon_offset_enabled {
            let offset = (state.polygon_offset_factor, state.polygon_offset_units);
            if ctx.polygon_offset != Some(offset) {
                device.polygon_offset(offset.0, offset.1);
                ctx.polygon_offset = Some(offset);
            }
        }

        // --- Culling ---
        let cull_face: Option<u32> = state.cull_mode.into_gl();
        set_capability(device, &mut ctx.cull_enabled, gl::CULL_FACE, cull_face.is_some());
        if let Some(face) = cull_face {
            if ctx.cull_face != Some(face) {
                device.cull_face(face);
                ctx.cull_face = Some(face);
            }
        }

        // --- Blending ---
        let blend: Option<(u32, u32)> = state.blend_mode.into_gl();
        set_capability(device, &mut ctx.blend_enabled, gl::BLEND, blend.is_some());
        if let Some((src, dst)) = blend {
            if ctx.blend_func != Some((src, dst)) {
                device.blend_func(src, dst);
                ctx.blend_func = Some((src, dst));
            }
        }

        // --- Stencil ---
        set_capability(device, &mut ctx.stencil_test, gl::STENCIL_TEST, state.stencil_test);
        if state.stencil_test {
            let front = stencil_ops(&state.stencil_front);
            if ctx.stencil_front_ops != Some(front) {
                device.stencil_op_separate(gl::FRONT, front.0, front.1, front.2);
                ctx.stencil_front_ops = Some(front);
            }
            let back = stencil_ops(&state.stencil_back);
            if ctx.stencil_back_ops != Some(back) {
                device.stencil_op_separate(gl::BACK, back.0, back.1, back.2);
                ctx.stencil_back_ops = Some(back);
            }
            let front_func = state.stencil_front.function.into_gl();
            if ctx.stencil_front_func != Some(front_func) {
                device.stencil_func_separate(gl::FRONT, front_func, 0, !0);
                ctx.stencil_front_func = Some(front_func);
            }
            let back_func = state.stencil_back.function.into_gl();
            if ctx.stencil_back_func != Some(back_func) {
                device.stencil_func_separate(gl::BACK, back_func, 0, !0);
                ctx.stencil_back_func = Some(back_func);
            }
        }

        // --- Scissor ---
        let scissor = match (state.scissor, self.clip_rect) {
            (Some(rect), Some(clip)) => Some(rect.intersection(&clip)),
            (rect, clip) => rect.or(clip),
        };
        self.apply_scissor(scissor);
    }

    fn apply_scissor(&mut self, scissor: Option<Rect>) {
        set_capability(
            &mut self.device,
            &mut self.context.scissor_enabled,
            gl::SCISSOR_TEST,
            scissor.is_some(),
        );
        if let Some(rect) = scissor {
            if self.context.scissor != Some(rect) {
                self.device
                    .scissor(rect.x, rect.y, gl_size(rect.width), gl_size(rect.height));
                self.context.scissor = Some(rect);
            }
        }
    }

    pub(super) fn apply_clip_rect(&mut self, clip: Option<Rect>) {
        self.clip_rect = clip;
        self.apply_scissor(clip);
    }

    pub(super) fn apply_viewport(&mut self, rect: Rect) {
        if self.context.viewport != Some(rect) {
            self.device
                .viewport(rect.x, rect.y, gl_size(rect.width), gl_size(rect.height));
            self.context.viewport = Some(rect);
        }
    }

    pub(super) fn apply_clear_color(&mut self, color: LinearRgba) {
        if self.context.clear_color != Some(color) {
            self.device.clear_color(color.r, color.g, color.b, color.a);
            self.context.clear_color = Some(color);
        }
    }

    pub(super) fn apply_depth_range(&mut self, near: f32, far: f32) {
        if self.context.depth_range != Some((near, far)) {
            self.device.depth_range(near, far);
            self.context.depth_range = Some((near, far));
        }
    }

    pub(super) fn apply_alpha_to_coverage(&mut self, enabled: bool) {
        if !self.caps.has(Caps::MULTISAMPLE) {
            if enabled {
                log::warn!("Alpha to coverage needs a multisampled target, request ignored");
            }
            return;
        }
        set_capability(
            &mut self.device,
            &mut self.context.alpha_to_coverage,
            gl::SAMPLE_ALPHA_TO_COVERAGE,
            enabled,
        );
    }

    pub(super) fn apply_framebuffer_srgb(&mut self, enabled: bool) {
        if !self.caps.has(Caps::SRGB) {
            return;
        }
        set_capability(
            &mut self.device,
            &mut self.context.framebuffer_srgb,
            gl::FRAMEBUFFER_SRGB,
            enabled,
        );
    }

    /// Line width only matters to line primitives.
    pub(super) fn apply_line_width(&mut self, mode: Mode, width: f32) {
        if !matches!(mode, Mode::Lines | Mode::LineLoop | Mode::LineStrip) {
            return;
        }
        if self.context.line_width != Some(width) {
            self.device.line_width(width);
            self.context.line_width = Some(width);
        }
    }

    /// Clears the requested buffers of the bound target.
    ///
    /// Masked-off channels are not cleared, so the colour and depth write masks
    /// are forced on first. They stay on afterwards.
    pub(super) fn clear(&mut self, color: bool, depth: bool, stencil: bool) {
        let mut mask = 0;
        if color {
            if self.context.color_write != Some(true) {
                self.device.color_mask(true, true, true, true);
                self.context.color_write = Some(true);
            }
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if depth {
            if self.context.depth_write != Some(true) {
                self.device.depth_mask(true);
                self.context.depth_write = Some(true);
            }
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if stencil {
            mask |= gl::STENCIL_BUFFER_BIT;
        }
        if mask != 0 {
            self.device.clear(mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graphics::gl::backends::recording::{GlCall, RecordingDevice};
    use crate::graphics::gl::renderer::GlRenderer;
    use glint_core::math::Rect;
    use glint_core::renderer::api::{BlendMode, FaceCullMode, RenderState, RendererConfig};
    use glint_core::renderer::Renderer;

    fn renderer() -> GlRenderer<RecordingDevice> {
        let mut renderer = GlRenderer::new(RecordingDevice::new(), RendererConfig::default());
        renderer.initialize().unwrap();
        renderer.device_mut().clear_calls();
        renderer
    }

    #[test]
    fn blend_parameters_change_without_toggling() {
        let mut renderer = renderer();
        let mut state = RenderState {
            blend_mode: BlendMode::Alpha,
            ..RenderState::default()
        };
        renderer.apply_render_state(&state);
        renderer.device_mut().clear_calls();

        state.blend_mode = BlendMode::Additive;
        renderer.apply_render_state(&state);
        assert_eq!(renderer.device().calls().len(), 1);
        assert!(matches!(
            renderer.device().calls()[0],
            GlCall::BlendFunc(_, _)
        ));
    }

    #[test]
    fn disabling_culling_skips_the_face() {
        let mut renderer = renderer();
        let state = RenderState {
            cull_mode: FaceCullMode::Off,
            ..RenderState::default()
        };
        renderer.apply_render_state(&state);
        assert_eq!(
            renderer.device().count(|call| matches!(call, GlCall::CullFace(_))),
            0
        );
    }

    #[test]
    fn scissor_is_intersected_with_the_clip_rect() {
        let mut renderer = renderer();
        renderer.set_clip_rect(Rect::new(0, 0, 100, 100));
        let state = RenderState {
            scissor: Some(Rect::new(50, 50, 100, 100)),
            ..RenderState::default()
        };
        renderer.apply_render_state(&state);
        assert_eq!(
            renderer.render_context().scissor,
            Some(Rect::new(50, 50, 50, 50))
        );

        renderer.clear_clip_rect();
        renderer.apply_render_state(&RenderState::default());
        assert_eq!(renderer.render_context().scissor_enabled, Some(false));
    }

    #[test]
    fn clearing_forces_write_masks() {
        let mut renderer = renderer();
        let state = RenderState {
            depth_write: false,
            color_write: false,
            ..RenderState::default()
        };
        renderer.apply_render_state(&state);
        renderer.device_mut().clear_calls();

        renderer.clear_buffers(true, true, false);
        let calls = renderer.device().calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[2], GlCall::Clear(_)));
        assert_eq!(renderer.render_context().depth_write, Some(true));
    }
}
