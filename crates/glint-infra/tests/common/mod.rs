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

//! Shared fixtures for the renderer integration tests.

#![allow(dead_code)]

use glint_core::renderer::api::{
    BufferType, Mesh, Mode, RendererConfig, Shader, ShaderSource, ShaderStage, Usage,
    VertexBuffer, VertexFormat,
};
use glint_core::Renderer;
use glint_infra::{GlRenderer, RecordingDevice};
use log::{Level, Log, Metadata, Record};
use std::cell::Cell;
use std::sync::OnceLock;

pub const VERTEX_SHADER: &str = "in vec3 inPosition;\nin vec4 inColor;\nuniform mat4 worldViewProj;\nvoid main() { gl_Position = worldViewProj * vec4(inPosition, 1.0); }\n";
pub const FRAGMENT_SHADER: &str = "uniform vec4 tint;\nout vec4 outFragColor;\nvoid main() { outFragColor = tint; }\n";

thread_local! {
    static WARNINGS: Cell<usize> = const { Cell::new(0) };
}

/// Forwards to `env_logger` and counts the warnings of the current thread.
struct CapturingLogger {
    inner: env_logger::Logger,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            WARNINGS.with(|count| count.set(count.get() + 1));
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the capturing logger once per test binary.
pub fn init_logging() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let inner = env_logger::Builder::from_default_env().is_test(true).build();
        let max_level = inner.filter().max(log::LevelFilter::Warn);
        if log::set_boxed_logger(Box::new(CapturingLogger { inner })).is_ok() {
            log::set_max_level(max_level);
        }
    });
}

/// The number of warnings logged by the current thread so far.
pub fn warnings() -> usize {
    WARNINGS.with(Cell::get)
}

/// An initialized renderer over `device`, with the recorded calls cleared.
pub fn renderer_with(device: RecordingDevice, config: RendererConfig) -> GlRenderer<RecordingDevice> {
    init_logging();
    let mut renderer = GlRenderer::new(device, config);
    renderer
        .initialize()
        .expect("the recording device satisfies the minimum requirements");
    renderer.device_mut().clear_calls();
    renderer
}

/// An initialized renderer over a GL 3.3 core recording device.
pub fn renderer() -> GlRenderer<RecordingDevice> {
    renderer_with(RecordingDevice::new(), RendererConfig::default())
}

pub fn shader_source(stage: ShaderStage, name: &str, body: &str) -> ShaderSource {
    ShaderSource::new(stage, name, "GLSL150", body)
}

/// A program declaring `inPosition`, `inColor`, `worldViewProj` and `tint`.
pub fn color_shader() -> Shader {
    Shader::new()
        .with_source(shader_source(ShaderStage::Vertex, "color.vert", VERTEX_SHADER))
        .with_source(shader_source(ShaderStage::Fragment, "color.frag", FRAGMENT_SHADER))
}

pub fn positions(vertices: usize) -> VertexBuffer {
    VertexBuffer::from_slice(
        BufferType::Position,
        Usage::Static,
        3,
        VertexFormat::Float,
        &vec![0.0f32; vertices * 3],
    )
}

pub fn indices(values: &[u16]) -> VertexBuffer {
    VertexBuffer::from_slice(
        BufferType::Index,
        Usage::Static,
        1,
        VertexFormat::UnsignedShort,
        values,
    )
}

/// A triangle list of `vertices` positions without indices.
pub fn triangle_mesh(vertices: usize) -> Mesh {
    Mesh::new(Mode::Triangles).with_buffer(positions(vertices))
}
