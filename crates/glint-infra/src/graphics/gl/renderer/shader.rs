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

//! Shader compilation, program linking and uniform upload.

use super::{backend_error, BoundShader, GlRenderer};
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::device::GlDevice;
use glint_core::renderer::api::{Caps, Location, Shader, ShaderSource};
use glint_core::renderer::{RenderError, ShaderError};
use std::rc::Rc;

/// Prepends the version directive and the defines to the body of a source.
///
/// GLSL 1.00 sources are compiled as 1.10, and 1.50+ sources request the core
/// profile.
pub(crate) fn merged_source(version: u32, source: &ShaderSource) -> String {
    let version = if version == 100 { 110 } else { version };
    let mut merged = format!("#version {version}");
    if version >= 150 {
        merged.push_str(" core");
    }
    merged.push('\n');

    let defines = source.defines();
    if !defines.is_empty() {
        merged.push_str(defines);
        if !defines.ends_with('\n') {
            merged.push('\n');
        }
    }
    merged.push_str(source.source());
    merged
}

fn numbered(source: &str) -> String {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>4}  {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<D: GlDevice> GlRenderer<D> {
    /// Makes `shader` the current program, linking it first if needed, and
    /// uploads the uniforms that changed.
    pub(super) fn bind_shader(&mut self, shader: &mut Shader) -> Result<(), RenderError> {
        if shader.object().is_update_needed() {
            self.update_program(shader)?;
        }
        let Some(handle) = shader.object().handle() else {
            return Err(RenderError::PreconditionViolation(
                "shader program has no native handle after upload".to_string(),
            ));
        };

        let program = handle.0;
        let switched = self.context.program != Some(program);
        if switched {
            self.device.use_program(Some(program));
            self.context.program = Some(program);
        }
        self.stats.on_shader_use(handle, switched);
        self.bound_shader = Some(BoundShader {
            program,
            attributes: Rc::clone(shader.attributes()),
        });

        self.upload_uniforms(program, shader);
        Ok(())
    }

    fn update_program(&mut self, shader: &mut Shader) -> Result<(), RenderError> {
        let (program, created) = match shader.object().handle() {
            Some(handle) => (handle.0, false),
            None => {
                let name = self.device.create_program().map_err(backend_error)?;
                self.track(shader.object(), name);
                (name, true)
            }
        };

        for source in shader.sources() {
            if source.object().is_update_needed() {
                let name = self.compile_source(source)?;
                self.device.attach_shader(program, name);
            } else if created {
                if let Some(handle) = source.object().handle() {
                    self.device.attach_shader(program, handle.0);
                }
            }
        }

        if self.caps.has(Caps::OPENGL30) {
            self.device.bind_frag_data_location(program, 0, "outFragColor");
            for i in 0..self.caps.limits.draw_buffers {
                self.device
                    .bind_frag_data_location(program, i, &format!("outFragData[{i}]"));
            }
        }

        self.device.link_program(program);
        let linked = self.device.program_link_status(program);
        let info = self.device.program_info_log(program);
        let names = || {
            shader
                .sources()
                .iter()
                .map(|source| source.name().to_string())
                .collect::<Vec<_>>()
        };
        if !linked {
            log::error!("Failed to link shader program [{}]:\n{info}", names().join(", "));
            return Err(ShaderError::LinkFailed {
                sources: names(),
                log: info,
            }
            .into());
        }
        if self.config.log_shader_info && !info.trim().is_empty() {
            log::warn!("Shader program [{}] link log:\n{info}", names().join(", "));
        }

        shader.object().clear_update_needed()?;
        // Locations are only valid for the link that produced them.
        shader.reset_locations();
        Ok(())
    }

    fn compile_source(&mut self, source: &ShaderSource) -> Result<u32, RenderError> {
        if source.object().is_allocated() {
            return Err(ShaderError::RecompileNotAllowed {
                name: source.name().to_string(),
            }
            .into());
        }
        let Some(version) = source.glsl_version() else {
            return Err(RenderError::PreconditionViolation(format!(
                "shader source '{}' uses unsupported language '{}'",
                source.name(),
                source.language()
            )));
        };

        let name = self
            .device
            .create_shader(source.stage().into_gl())
            .map_err(backend_error)?;
        self.track(source.object(), name);

        let merged = merged_source(version, source);
        self.device.shader_source(name, &merged);
        self.device.compile_shader(name);
        let compiled = self.device.shader_compile_status(name);
        let info = self.device.shader_info_log(name);

        if !compiled {
            log::error!(
                "Bad compile of {:?} shader '{}':\n{}\n{info}",
                source.stage(),
                source.name(),
                numbered(&merged)
            );
            return Err(ShaderError::CompileFailed {
                name: source.name().to_string(),
                stage: source.stage(),
                merged_source: merged,
                log: info,
            }
            .into());
        }
        if self.config.log_shader_info && !info.trim().is_empty() {
            log::warn!("{:?} shader '{}' compile log:\n{info}", source.stage(), source.name());
        }

        source.object().clear_update_needed()?;
        Ok(name)
    }

    fn upload_uniforms(&mut self, program: u32, shader: &mut Shader) {
        for uniform in shader.uniforms_mut() {
            if !uniform.update_needed {
                continue;
            }
            let Some(value) = &uniform.value else {
                continue;
            };
            if uniform.location == Location::Unresolved {
                uniform.location = match self.device.uniform_location(program, &uniform.name) {
                    Some(location) => Location::At(location),
                    None => Location::NotDeclared,
                };
            }
            if let Location::At(location) = uniform.location {
                self.device.set_uniform(location, value);
                self.stats.on_uniform_set();
            }
            uniform.update_needed = false;
        }
    }

    /// Deletes the program of `shader` along with its compiled sources.
    pub(super) fn delete_program(&mut self, shader: &Shader) {
        let Some(program) = shader.object().handle() else {
            log::warn!("Shader is not uploaded to GPU, cannot delete.");
            return;
        };
        for source in shader.sources() {
            if let Some(handle) = source.object().handle() {
                self.device.detach_shader(program.0, handle.0);
                self.delete_object(source.object());
            }
        }
        self.delete_object(shader.object());
    }
}
