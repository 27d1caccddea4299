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

//! The desired fixed-function state of a draw call.

use crate::math::Rect;

/// A comparison function used by depth, stencil and shadow tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestFunction {
    /// Never passes.
    Never,
    /// Passes if the incoming value is equal to the stored value.
    Equal,
    /// Passes if the incoming value is less than the stored value.
    Less,
    /// Passes if the incoming value is less than or equal to the stored value.
    #[default]
    LessOrEqual,
    /// Passes if the incoming value is greater than the stored value.
    Greater,
    /// Passes if the incoming value is greater than or equal to the stored value.
    GreaterOrEqual,
    /// Passes if the incoming value is not equal to the stored value.
    NotEqual,
    /// Always passes.
    Always,
}

/// An operation applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to 0.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment, clamping at the maximum.
    Increment,
    /// Increment, wrapping to 0.
    IncrementWrap,
    /// Decrement, clamping at 0.
    Decrement,
    /// Decrement, wrapping to the maximum.
    DecrementWrap,
    /// Bitwise invert.
    Invert,
}

/// The stencil test and operations for one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFace {
    /// Applied when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Applied when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Applied when both tests pass.
    pub depth_pass_op: StencilOperation,
    /// The stencil comparison.
    pub function: TestFunction,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            depth_pass_op: StencilOperation::Keep,
            function: TestFunction::Always,
        }
    }
}

/// A blending preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// No blending.
    #[default]
    Off,
    /// `src + dst`.
    Additive,
    /// `src * src.a + dst`.
    AlphaAdditive,
    /// `src + dst * (1 - src)`.
    Color,
    /// `src * src.a + dst * (1 - src.a)`.
    Alpha,
    /// `src + dst * (1 - src.a)`, for premultiplied colours.
    PremultAlpha,
    /// `src * dst`.
    Modulate,
    /// `2 * src * dst`.
    ModulateX2,
}

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCullMode {
    /// Nothing is culled.
    Off,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    #[default]
    Back,
    /// Every polygon is culled.
    FrontAndBack,
}

/// The fixed-function state requested for a draw call.
///
/// This is a plain value compared against the renderer's state cache; it owns no
/// device resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Rasterize polygons as lines.
    pub wireframe: bool,
    /// Enables the depth test.
    pub depth_test: bool,
    /// The depth comparison.
    pub depth_func: TestFunction,
    /// Enables depth writes.
    pub depth_write: bool,
    /// Enables colour writes.
    pub color_write: bool,
    /// The blending preset.
    pub blend_mode: BlendMode,
    /// Face culling.
    pub cull_mode: FaceCullMode,
    /// Enables polygon offset for filled polygons.
    pub polygon_offset_enabled: bool,
    /// Polygon offset slope factor.
    pub polygon_offset_factor: f32,
    /// Polygon offset constant units.
    pub polygon_offset_units: f32,
    /// Enables the stencil test.
    pub stencil_test: bool,
    /// Stencil state of front faces.
    pub stencil_front: StencilFace,
    /// Stencil state of back faces.
    pub stencil_back: StencilFace,
    /// Restricts rendering to a rectangle, intersected with the clip rectangle.
    pub scissor: Option<Rect>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            wireframe: false,
            depth_test: true,
            depth_func: TestFunction::LessOrEqual,
            depth_write: true,
            color_write: true,
            blend_mode: BlendMode::Off,
            cull_mode: FaceCullMode::Back,
            polygon_offset_enabled: false,
            polygon_offset_factor: 0.0,
            polygon_offset_units: 0.0,
            stencil_test: false,
            stencil_front: StencilFace::default(),
            stencil_back: StencilFace::default(),
            scissor: None,
        }
    }
}

impl RenderState {
    /// State for transparent geometry: alpha blending without depth writes.
    pub fn transparent() -> Self {
        Self {
            blend_mode: BlendMode::Alpha,
            depth_write: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let state = RenderState::default();
        assert!(state.depth_test);
        assert!(state.depth_write);
        assert_eq!(state.depth_func, TestFunction::LessOrEqual);
        assert_eq!(state.cull_mode, FaceCullMode::Back);
        assert_eq!(state.blend_mode, BlendMode::Off);
        assert_eq!(state.stencil_front.function, TestFunction::Always);
    }

    #[test]
    fn transparent_preset() {
        let state = RenderState::transparent();
        assert_eq!(state.blend_mode, BlendMode::Alpha);
        assert!(!state.depth_write);
        assert!(state.depth_test);
    }
}
