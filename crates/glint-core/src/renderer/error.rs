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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Errors are layered: [`ShaderError`] and [`FramebufferError`] describe a single
//! resource kind, [`ResourceError`] groups every resource-level failure and
//! [`RenderError`] is what the [`Renderer`](crate::renderer::Renderer) facade returns.

use crate::renderer::api::shader::ShaderStage;
use std::fmt;

/// An error related to the compilation or linking of a shader program.
#[derive(Debug)]
pub enum ShaderError {
    /// A shader source failed to compile on the device.
    CompileFailed {
        /// The name of the failing source.
        name: String,
        /// The stage of the failing source.
        stage: ShaderStage,
        /// The full source handed to the device (version header, defines and body).
        merged_source: String,
        /// The driver's diagnostic log.
        log: String,
    },
    /// The program failed to link.
    LinkFailed {
        /// The names of the sources that were attached to the program.
        sources: Vec<String>,
        /// The driver's diagnostic log.
        log: String,
    },
    /// An already compiled source was modified and submitted again.
    ///
    /// A source is compiled exactly once; create a new source instead.
    RecompileNotAllowed {
        /// The name of the source.
        name: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompileFailed {
                name,
                stage,
                merged_source,
                log,
            } => {
                write!(
                    f,
                    "{stage:?} shader '{name}' failed to compile: {log}\n{merged_source}"
                )
            }
            ShaderError::LinkFailed { sources, log } => {
                write!(
                    f,
                    "Shader program [{}] failed to link: {log}",
                    sources.join(", ")
                )
            }
            ShaderError::RecompileNotAllowed { name } => {
                write!(f, "Cannot recompile shader source '{name}'")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// The reason a framebuffer was reported incomplete by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferError {
    /// The combination of attachment formats is not supported by the device.
    UnsupportedFormatCombination,
    /// An attachment point is not framebuffer-attachment complete.
    IncompleteAttachment,
    /// The framebuffer has no image attached.
    MissingAttachment,
    /// The attached images do not share the same dimensions.
    MismatchedDimensions,
    /// The colour attachments do not share the same internal format.
    MismatchedFormats,
    /// A selected draw buffer names an attachment point without an image.
    IncompleteDrawBuffer,
    /// The selected read buffer names an attachment point without an image.
    IncompleteReadBuffer,
    /// The attachments do not share the same sample count.
    IncompleteMultisample,
    /// Layered and non-layered attachments are mixed.
    IncompleteLayerTargets,
    /// The default framebuffer was bound but does not exist.
    Undefined,
    /// The device returned a status this crate does not know about.
    Unknown(u32),
}

impl fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferError::UnsupportedFormatCombination => write!(
                f,
                "Framebuffer object format is unsupported by the video hardware."
            ),
            FramebufferError::IncompleteAttachment => {
                write!(f, "Framebuffer has an incomplete attachment.")
            }
            FramebufferError::MissingAttachment => {
                write!(f, "Framebuffer doesn't have any renderbuffers attached.")
            }
            FramebufferError::MismatchedDimensions => {
                write!(f, "Framebuffer attachments must have same dimensions.")
            }
            FramebufferError::MismatchedFormats => {
                write!(f, "Framebuffer attachments must have same formats.")
            }
            FramebufferError::IncompleteDrawBuffer => {
                write!(f, "Incomplete draw buffer.")
            }
            FramebufferError::IncompleteReadBuffer => {
                write!(f, "Incomplete read buffer.")
            }
            FramebufferError::IncompleteMultisample => {
                write!(f, "Incomplete multisample buffer.")
            }
            FramebufferError::IncompleteLayerTargets => {
                write!(f, "Framebuffer mixes layered and non-layered attachments.")
            }
            FramebufferError::Undefined => write!(f, "Default framebuffer is undefined."),
            FramebufferError::Unknown(status) => {
                write!(f, "Some video driver error or programming error occurred. Framebuffer object status is invalid: {status:#x}")
            }
        }
    }
}

impl std::error::Error for FramebufferError {}

/// An error related to the creation or upload of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A framebuffer failed its completeness check.
    IncompleteFramebuffer(FramebufferError),
    /// The requested format has no native mapping under the negotiated capabilities.
    UnsupportedFormat(String),
    /// A resource exceeds a negotiated size limit.
    TooLarge {
        /// What was being created (e.g. "cube map", "renderbuffer").
        what: &'static str,
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
        /// The negotiated maximum dimension.
        max: u32,
    },
    /// A framebuffer requests more attachments or draw buffers than the device allows.
    TooManyAttachments {
        /// The kind of limit exceeded ("color attachments" or "draw buffers").
        limit: &'static str,
        /// The number requested.
        requested: usize,
        /// The negotiated maximum.
        max: usize,
    },
    /// An error originating from the native device (e.g. object creation failed).
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::IncompleteFramebuffer(err) => {
                write!(f, "Framebuffer is incomplete: {err}")
            }
            ResourceError::UnsupportedFormat(format) => {
                write!(f, "Image format '{format}' is unsupported by the video hardware.")
            }
            ResourceError::TooLarge {
                what,
                width,
                height,
                max,
            } => write!(
                f,
                "Cannot create {what} of {width}x{height}: the maximum supported resolution is {max}"
            ),
            ResourceError::TooManyAttachments {
                limit,
                requested,
                max,
            } => write!(
                f,
                "Framebuffer requests {requested} {limit}, but the video hardware supports {max}"
            ),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::IncompleteFramebuffer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<FramebufferError> for ResourceError {
    fn from(err: FramebufferError) -> Self {
        ResourceError::IncompleteFramebuffer(err)
    }
}

/// A high-level error returned by the renderer facade.
#[derive(Debug)]
pub enum RenderError {
    /// An operation was attempted before the renderer was initialized.
    NotInitialized,
    /// The device lacks the minimum capabilities; the renderer cannot run on it.
    UnsupportedDevice(String),
    /// An optional feature was requested without negotiated support.
    UnsupportedOperation(String),
    /// The caller broke the renderer's contract (a programming error).
    PreconditionViolation(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "The renderer is not initialized."),
            RenderError::UnsupportedDevice(msg) => {
                write!(f, "The graphics device is not supported: {msg}")
            }
            RenderError::UnsupportedOperation(msg) => {
                write!(f, "Operation not supported by the video hardware: {msg}")
            }
            RenderError::PreconditionViolation(msg) => {
                write!(f, "Renderer precondition violated: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(ResourceError::Shader(err))
    }
}

impl From<FramebufferError> for RenderError {
    fn from(err: FramebufferError) -> Self {
        RenderError::ResourceError(ResourceError::IncompleteFramebuffer(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::CompileFailed {
            name: "Unshaded.vert".to_string(),
            stage: ShaderStage::Vertex,
            merged_source: "#version 150 core\nvoid main() {}".to_string(),
            log: "0:1: syntax error".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Vertex shader 'Unshaded.vert' failed to compile: 0:1: syntax error\n#version 150 core\nvoid main() {}"
        );

        let err = ShaderError::RecompileNotAllowed {
            name: "Unshaded.frag".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Cannot recompile shader source 'Unshaded.frag'"
        );
    }

    #[test]
    fn resource_error_display_wrapping_framebuffer_error() {
        let res_err: ResourceError = FramebufferError::MismatchedDimensions.into();
        assert_eq!(
            format!("{res_err}"),
            "Framebuffer is incomplete: Framebuffer attachments must have same dimensions."
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_display_wrapping_shader_error() {
        let render_err: RenderError = ShaderError::LinkFailed {
            sources: vec!["a.vert".into(), "a.frag".into()],
            log: "missing main".into(),
        }
        .into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Shader resource error: Shader program [a.vert, a.frag] failed to link: missing main"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().and_then(|e| e.source()).is_some());
    }

    #[test]
    fn limit_errors_name_the_limit() {
        let err = ResourceError::TooManyAttachments {
            limit: "draw buffers",
            requested: 5,
            max: 4,
        };
        assert_eq!(
            format!("{err}"),
            "Framebuffer requests 5 draw buffers, but the video hardware supports 4"
        );
        let err = ResourceError::TooLarge {
            what: "texture",
            width: 8192,
            height: 8192,
            max: 4096,
        };
        assert_eq!(
            format!("{err}"),
            "Cannot create texture of 8192x8192: the maximum supported resolution is 4096"
        );
    }
}
