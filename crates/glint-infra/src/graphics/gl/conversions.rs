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

use super::enums as gl;
use glint_core::renderer::api::{
    AttachmentSlot, BlendMode, FaceCullMode, MagFilter, MinFilter, Mode, ShaderStage,
    ShadowCompareMode, StencilOperation, TestFunction, TextureType, Usage, VertexFormat, WrapMode,
};

/// A local extension trait to convert our abstract enums into native GL enumerants.
/// This keeps the `.into_gl()` syntax on foreign types without a newtype.
pub trait IntoGl<T> {
    /// Consumes self and converts it into its native counterpart.
    fn into_gl(self) -> T;
}

// --- Vertex data ---

impl IntoGl<u32> for VertexFormat {
    fn into_gl(self) -> u32 {
        match self {
            VertexFormat::Byte => gl::BYTE,
            VertexFormat::UnsignedByte => gl::UNSIGNED_BYTE,
            VertexFormat::Short => gl::SHORT,
            VertexFormat::UnsignedShort => gl::UNSIGNED_SHORT,
            VertexFormat::Int => gl::INT,
            VertexFormat::UnsignedInt => gl::UNSIGNED_INT,
            VertexFormat::Half => gl::HALF_FLOAT,
            VertexFormat::Float => gl::FLOAT,
            VertexFormat::Double => gl::DOUBLE,
        }
    }
}

/// `CpuOnly` buffers never reach the device; they map to `STATIC_DRAW` so the
/// conversion stays total.
impl IntoGl<u32> for Usage {
    fn into_gl(self) -> u32 {
        match self {
            Usage::Static | Usage::CpuOnly => gl::STATIC_DRAW,
            Usage::Dynamic => gl::DYNAMIC_DRAW,
            Usage::Stream => gl::STREAM_DRAW,
        }
    }
}

/// Hybrid meshes are dispatched per range, the whole mesh maps to triangles.
impl IntoGl<u32> for Mode {
    fn into_gl(self) -> u32 {
        match self {
            Mode::Points => gl::POINTS,
            Mode::Lines => gl::LINES,
            Mode::LineLoop => gl::LINE_LOOP,
            Mode::LineStrip => gl::LINE_STRIP,
            Mode::Triangles | Mode::Hybrid => gl::TRIANGLES,
            Mode::TriangleStrip => gl::TRIANGLE_STRIP,
            Mode::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

// --- Fixed-function state ---

impl IntoGl<u32> for TestFunction {
    fn into_gl(self) -> u32 {
        match self {
            TestFunction::Never => gl::NEVER,
            TestFunction::Equal => gl::EQUAL,
            TestFunction::Less => gl::LESS,
            TestFunction::LessOrEqual => gl::LEQUAL,
            TestFunction::Greater => gl::GREATER,
            TestFunction::GreaterOrEqual => gl::GEQUAL,
            TestFunction::NotEqual => gl::NOTEQUAL,
            TestFunction::Always => gl::ALWAYS,
        }
    }
}

impl IntoGl<u32> for StencilOperation {
    fn into_gl(self) -> u32 {
        match self {
            StencilOperation::Keep => gl::KEEP,
            StencilOperation::Zero => gl::ZERO,
            StencilOperation::Replace => gl::REPLACE,
            StencilOperation::Increment => gl::INCR,
            StencilOperation::IncrementWrap => gl::INCR_WRAP,
            StencilOperation::Decrement => gl::DECR,
            StencilOperation::DecrementWrap => gl::DECR_WRAP,
            StencilOperation::Invert => gl::INVERT,
        }
    }
}

/// The `(source, destination)` blend factors. `None` for [`BlendMode::Off`].
impl IntoGl<Option<(u32, u32)>> for BlendMode {
    fn into_gl(self) -> Option<(u32, u32)> {
        match self {
            BlendMode::Off => None,
            BlendMode::Additive => Some((gl::ONE, gl::ONE)),
            BlendMode::AlphaAdditive => Some((gl::SRC_ALPHA, gl::ONE)),
            BlendMode::Color => Some((gl::ONE, gl::ONE_MINUS_SRC_COLOR)),
            BlendMode::Alpha => Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)),
            BlendMode::PremultAlpha => Some((gl::ONE, gl::ONE_MINUS_SRC_ALPHA)),
            BlendMode::Modulate => Some((gl::DST_COLOR, gl::ZERO)),
            BlendMode::ModulateX2 => Some((gl::DST_COLOR, gl::SRC_COLOR)),
        }
    }
}

/// The culled face. `None` for [`FaceCullMode::Off`].
impl IntoGl<Option<u32>> for FaceCullMode {
    fn into_gl(self) -> Option<u32> {
        match self {
            FaceCullMode::Off => None,
            FaceCullMode::Front => Some(gl::FRONT),
            FaceCullMode::Back => Some(gl::BACK),
            FaceCullMode::FrontAndBack => Some(gl::FRONT_AND_BACK),
        }
    }
}

// --- Sampling ---

impl IntoGl<u32> for MinFilter {
    fn into_gl(self) -> u32 {
        match self {
            MinFilter::NearestNoMipMaps => gl::NEAREST,
            MinFilter::BilinearNoMipMaps => gl::LINEAR,
            MinFilter::NearestNearestMipMap => gl::NEAREST_MIPMAP_NEAREST,
            MinFilter::BilinearNearestMipMap => gl::LINEAR_MIPMAP_NEAREST,
            MinFilter::NearestLinearMipMap => gl::NEAREST_MIPMAP_LINEAR,
            MinFilter::Trilinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

impl IntoGl<u32> for MagFilter {
    fn into_gl(self) -> u32 {
        match self {
            MagFilter::Nearest => gl::NEAREST,
            MagFilter::Bilinear => gl::LINEAR,
        }
    }
}

impl IntoGl<u32> for WrapMode {
    fn into_gl(self) -> u32 {
        match self {
            WrapMode::Repeat => gl::REPEAT,
            WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
            WrapMode::EdgeClamp => gl::CLAMP_TO_EDGE,
            WrapMode::BorderClamp => gl::CLAMP_TO_BORDER,
        }
    }
}

/// The depth comparison function. `None` when comparison is off.
impl IntoGl<Option<u32>> for ShadowCompareMode {
    fn into_gl(self) -> Option<u32> {
        match self {
            ShadowCompareMode::Off => None,
            ShadowCompareMode::LessOrEqual => Some(gl::LEQUAL),
            ShadowCompareMode::GreaterOrEqual => Some(gl::GEQUAL),
        }
    }
}

/// The binding target of a texture.
impl IntoGl<u32> for TextureType {
    fn into_gl(self) -> u32 {
        match self {
            TextureType::TwoDimensional => gl::TEXTURE_2D,
            TextureType::TwoDimensionalArray => gl::TEXTURE_2D_ARRAY,
            TextureType::ThreeDimensional => gl::TEXTURE_3D,
            TextureType::CubeMap => gl::TEXTURE_CUBE_MAP,
        }
    }
}

// --- Programs and targets ---

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::TessellationControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessellationEvaluation => gl::TESS_EVALUATION_SHADER,
        }
    }
}

/// The framebuffer attachment point. Depth formats with a stencil component
/// attach to `DEPTH_STENCIL_ATTACHMENT`, see [`depth_attachment_point`].
impl IntoGl<u32> for AttachmentSlot {
    fn into_gl(self) -> u32 {
        match self {
            AttachmentSlot::Depth => gl::DEPTH_ATTACHMENT,
            AttachmentSlot::Color(index) => gl::COLOR_ATTACHMENT0 + u32::from(index),
        }
    }
}

/// The attachment point of a depth buffer, depending on whether it carries stencil.
pub const fn depth_attachment_point(has_stencil: bool) -> u32 {
    if has_stencil {
        gl::DEPTH_STENCIL_ATTACHMENT
    } else {
        gl::DEPTH_ATTACHMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_conversion() {
        assert_eq!(VertexFormat::Float.into_gl(), gl::FLOAT);
        assert_eq!(VertexFormat::Half.into_gl(), gl::HALF_FLOAT);
        assert_eq!(VertexFormat::UnsignedShort.into_gl(), gl::UNSIGNED_SHORT);
        assert_eq!(VertexFormat::Double.into_gl(), gl::DOUBLE);
    }

    #[test]
    fn test_usage_conversion() {
        assert_eq!(Usage::Static.into_gl(), gl::STATIC_DRAW);
        assert_eq!(Usage::Dynamic.into_gl(), gl::DYNAMIC_DRAW);
        assert_eq!(Usage::Stream.into_gl(), gl::STREAM_DRAW);
    }

    #[test]
    fn test_mode_conversion() {
        assert_eq!(Mode::Points.into_gl(), gl::POINTS);
        assert_eq!(Mode::LineLoop.into_gl(), gl::LINE_LOOP);
        assert_eq!(Mode::TriangleFan.into_gl(), gl::TRIANGLE_FAN);
        assert_eq!(Mode::Hybrid.into_gl(), gl::TRIANGLES);
    }

    #[test]
    fn test_test_function_conversion() {
        assert_eq!(TestFunction::LessOrEqual.into_gl(), gl::LEQUAL);
        assert_eq!(TestFunction::NotEqual.into_gl(), gl::NOTEQUAL);
        assert_eq!(TestFunction::Always.into_gl(), gl::ALWAYS);
    }

    #[test]
    fn test_stencil_operation_conversion() {
        assert_eq!(StencilOperation::Keep.into_gl(), gl::KEEP);
        assert_eq!(StencilOperation::IncrementWrap.into_gl(), gl::INCR_WRAP);
        assert_eq!(StencilOperation::Invert.into_gl(), gl::INVERT);
    }

    #[test]
    fn test_blend_mode_conversion() {
        let off: Option<(u32, u32)> = BlendMode::Off.into_gl();
        assert_eq!(off, None);
        assert_eq!(BlendMode::Additive.into_gl(), Some((gl::ONE, gl::ONE)));
        assert_eq!(
            BlendMode::Alpha.into_gl(),
            Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA))
        );
        assert_eq!(
            BlendMode::PremultAlpha.into_gl(),
            Some((gl::ONE, gl::ONE_MINUS_SRC_ALPHA))
        );
        assert_eq!(
            BlendMode::ModulateX2.into_gl(),
            Some((gl::DST_COLOR, gl::SRC_COLOR))
        );
    }

    #[test]
    fn test_cull_mode_conversion() {
        let off: Option<u32> = FaceCullMode::Off.into_gl();
        assert_eq!(off, None);
        assert_eq!(FaceCullMode::Back.into_gl(), Some(gl::BACK));
        assert_eq!(FaceCullMode::FrontAndBack.into_gl(), Some(gl::FRONT_AND_BACK));
    }

    #[test]
    fn test_filter_conversion() {
        assert_eq!(MinFilter::Trilinear.into_gl(), gl::LINEAR_MIPMAP_LINEAR);
        assert_eq!(MinFilter::NearestNoMipMaps.into_gl(), gl::NEAREST);
        assert_eq!(MagFilter::Bilinear.into_gl(), gl::LINEAR);
    }

    #[test]
    fn test_wrap_and_compare_conversion() {
        assert_eq!(WrapMode::EdgeClamp.into_gl(), gl::CLAMP_TO_EDGE);
        assert_eq!(WrapMode::MirroredRepeat.into_gl(), gl::MIRRORED_REPEAT);
        let off: Option<u32> = ShadowCompareMode::Off.into_gl();
        assert_eq!(off, None);
        assert_eq!(ShadowCompareMode::GreaterOrEqual.into_gl(), Some(gl::GEQUAL));
    }

    #[test]
    fn test_target_and_stage_conversion() {
        assert_eq!(TextureType::CubeMap.into_gl(), gl::TEXTURE_CUBE_MAP);
        assert_eq!(TextureType::TwoDimensionalArray.into_gl(), gl::TEXTURE_2D_ARRAY);
        assert_eq!(ShaderStage::Fragment.into_gl(), gl::FRAGMENT_SHADER);
        assert_eq!(ShaderStage::TessellationEvaluation.into_gl(), gl::TESS_EVALUATION_SHADER);
    }

    #[test]
    fn test_attachment_conversion() {
        assert_eq!(AttachmentSlot::Color(3).into_gl(), gl::COLOR_ATTACHMENT0 + 3);
        assert_eq!(AttachmentSlot::Depth.into_gl(), gl::DEPTH_ATTACHMENT);
        assert_eq!(depth_attachment_point(true), gl::DEPTH_STENCIL_ATTACHMENT);
    }
}
