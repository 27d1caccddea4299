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

//! Performance statistics for the renderer.

use super::object::{NativeHandle, NativeKind};
use std::collections::HashSet;

/// Counters gathered by the renderer, for profiling.
///
/// Per-frame counters are reset by [`Statistics::on_frame`]; live object counts
/// persist until the device context is lost.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// A sequential counter for frames.
    pub frame_number: u64,
    /// Meshes drawn this frame.
    pub meshes_drawn: u32,
    /// Native draw calls issued this frame.
    pub draw_calls: u32,
    /// Vertices submitted this frame, counting every instance.
    pub vertices: u64,
    /// Uniform uploads this frame.
    pub uniforms_set: u32,
    /// Program binds that changed the bound program this frame.
    pub shader_switches: u32,
    /// Texture binds that changed a unit's texture this frame.
    pub texture_switches: u32,
    /// Framebuffer binds that changed the bound framebuffer this frame.
    pub framebuffer_switches: u32,
    /// Distinct programs used this frame.
    pub shaders_used: u32,
    /// Distinct textures used this frame.
    pub textures_used: u32,
    /// Distinct framebuffers used this frame (the default target included).
    pub framebuffers_used: u32,
    /// Native buffers currently alive.
    pub live_buffers: u32,
    /// Native textures currently alive.
    pub live_textures: u32,
    /// Native programs currently alive.
    pub live_shaders: u32,
    /// Native framebuffers currently alive.
    pub live_framebuffers: u32,
    used_shaders: HashSet<NativeHandle>,
    used_textures: HashSet<NativeHandle>,
    used_framebuffers: HashSet<Option<NativeHandle>>,
}

impl Statistics {
    /// Starts a new frame, resetting every per-frame counter.
    pub fn on_frame(&mut self) {
        self.frame_number += 1;
        self.meshes_drawn = 0;
        self.draw_calls = 0;
        self.vertices = 0;
        self.uniforms_set = 0;
        self.shader_switches = 0;
        self.texture_switches = 0;
        self.framebuffer_switches = 0;
        self.shaders_used = 0;
        self.textures_used = 0;
        self.framebuffers_used = 0;
        self.used_shaders.clear();
        self.used_textures.clear();
        self.used_framebuffers.clear();
    }

    /// Records a drawn mesh.
    pub fn on_mesh_drawn(&mut self, vertices: usize, instances: u32) {
        self.meshes_drawn += 1;
        self.vertices += vertices as u64 * u64::from(instances.max(1));
    }

    /// Records one native draw call.
    pub fn on_draw_call(&mut self) {
        self.draw_calls += 1;
    }

    /// Records one uniform upload.
    pub fn on_uniform_set(&mut self) {
        self.uniforms_set += 1;
    }

    /// Records the use of a program.
    pub fn on_shader_use(&mut self, handle: NativeHandle, switched: bool) {
        if switched {
            self.shader_switches += 1;
        }
        if self.used_shaders.insert(handle) {
            self.shaders_used += 1;
        }
    }

    /// Records the use of a texture.
    pub fn on_texture_use(&mut self, handle: NativeHandle, switched: bool) {
        if switched {
            self.texture_switches += 1;
        }
        if self.used_textures.insert(handle) {
            self.textures_used += 1;
        }
    }

    /// Records the use of a framebuffer, `None` being the default target.
    pub fn on_framebuffer_use(&mut self, handle: Option<NativeHandle>, switched: bool) {
        if switched {
            self.framebuffer_switches += 1;
        }
        if self.used_framebuffers.insert(handle) {
            self.framebuffers_used += 1;
        }
    }

    /// Records the creation of a native object.
    pub fn on_new_object(&mut self, kind: NativeKind) {
        if let Some(count) = self.live_count_mut(kind) {
            *count += 1;
        }
    }

    /// Records the deletion of a native object.
    pub fn on_delete_object(&mut self, kind: NativeKind) {
        if let Some(count) = self.live_count_mut(kind) {
            *count = count.saturating_sub(1);
        }
    }

    fn live_count_mut(&mut self, kind: NativeKind) -> Option<&mut u32> {
        match kind {
            NativeKind::Buffer => Some(&mut self.live_buffers),
            NativeKind::Texture => Some(&mut self.live_textures),
            NativeKind::Program => Some(&mut self.live_shaders),
            NativeKind::FrameBuffer => Some(&mut self.live_framebuffers),
            NativeKind::ShaderSource | NativeKind::RenderBuffer => None,
        }
    }

    /// Forgets every live object count, after the device context was lost.
    pub fn clear_memory(&mut self) {
        self.live_buffers = 0;
        self.live_textures = 0;
        self.live_shaders = 0;
        self.live_framebuffers = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_objects_per_frame() {
        let mut stats = Statistics::default();
        stats.on_shader_use(NativeHandle(1), true);
        stats.on_shader_use(NativeHandle(1), false);
        stats.on_shader_use(NativeHandle(2), true);
        assert_eq!(stats.shader_switches, 2);
        assert_eq!(stats.shaders_used, 2);

        stats.on_frame();
        assert_eq!(stats.frame_number, 1);
        assert_eq!(stats.shaders_used, 0);
        stats.on_shader_use(NativeHandle(1), false);
        assert_eq!(stats.shaders_used, 1);
    }

    #[test]
    fn live_counts_survive_frames() {
        let mut stats = Statistics::default();
        stats.on_new_object(NativeKind::Texture);
        stats.on_new_object(NativeKind::Texture);
        stats.on_delete_object(NativeKind::Texture);
        stats.on_frame();
        assert_eq!(stats.live_textures, 1);
        stats.clear_memory();
        assert_eq!(stats.live_textures, 0);
        stats.on_delete_object(NativeKind::Texture);
        assert_eq!(stats.live_textures, 0);
    }

    #[test]
    fn instanced_vertices() {
        let mut stats = Statistics::default();
        stats.on_mesh_drawn(36, 10);
        stats.on_mesh_drawn(3, 1);
        assert_eq!(stats.vertices, 363);
        assert_eq!(stats.meshes_drawn, 2);
    }
}
