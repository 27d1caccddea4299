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

//! Data types exchanged between the scene layer and a rendering backend.

pub mod buffer;
pub mod caps;
pub mod framebuffer;
pub mod image;
pub mod mesh;
pub mod object;
pub mod settings;
pub mod shader;
pub mod state;
pub mod stats;
pub mod texture;

pub use self::buffer::{BufferType, Usage, VertexBuffer, VertexFormat};
pub use self::caps::{Capabilities, Caps, Limits};
pub use self::framebuffer::{AttachmentSlot, FrameBuffer, RenderBuffer};
pub use self::image::{ColorSpace, Image, ImageFormat, SharedImage};
pub use self::mesh::{Mesh, Mode, ModeStart};
pub use self::object::{GpuObject, NativeHandle, NativeKind, ObjectId, WeakGpuObject};
pub use self::settings::RendererConfig;
pub use self::shader::{
    AttributeTable, Location, Shader, ShaderSource, ShaderStage, Uniform, UniformValue,
};
pub use self::state::{
    BlendMode, FaceCullMode, RenderState, StencilFace, StencilOperation, TestFunction,
};
pub use self::stats::Statistics;
pub use self::texture::{
    MagFilter, MinFilter, SamplerState, ShadowCompareMode, Texture, TextureType, WrapAxis,
    WrapMode,
};
