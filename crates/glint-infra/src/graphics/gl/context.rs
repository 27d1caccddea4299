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

//! The mirror of the device state set by the renderer.
//!
//! Every field is an `Option`: `None` means "unknown", and the next request for
//! that field always reaches the device. Bindings store the raw native name,
//! with `Some(0)` meaning the zero object is bound.

use glint_core::math::{LinearRgba, Rect};
use std::collections::HashMap;

/// The number of texture units tracked.
pub const MAX_TEXTURE_UNITS: usize = 32;
/// The number of vertex attribute slots tracked.
pub const MAX_VERTEX_ATTRIBS: usize = 16;

/// Converts a cached binding back to the device's "zero is `None`" convention.
pub(crate) fn binding(name: u32) -> Option<u32> {
    (name != 0).then_some(name)
}

/// Sampling parameters last applied to one native texture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplerCache {
    pub min_filter: Option<u32>,
    pub mag_filter: Option<u32>,
    pub wrap_s: Option<u32>,
    pub wrap_t: Option<u32>,
    pub wrap_r: Option<u32>,
    pub anisotropy: Option<f32>,
    /// `Some(None)` when comparison is known to be off.
    pub compare: Option<Option<u32>>,
}

/// One vertex attribute slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttribSlot {
    pub enabled: Option<bool>,
    pub divisor: Option<u32>,
    /// The buffer the slot's pointer was last set from.
    pub buffer: Option<u32>,
}

/// Tracks which slots a draw uses compared to the previous draw.
#[derive(Debug, Clone, Default)]
pub struct IdList {
    new: Vec<u32>,
    old: Vec<u32>,
}

impl IdList {
    /// Records `id` as used by the current draw.
    ///
    /// Returns `true` if the previous draw did not use it.
    pub fn move_to_new(&mut self, id: u32) -> bool {
        if !self.new.contains(&id) {
            self.new.push(id);
        }
        !self.old.contains(&id)
    }

    /// The ids used by the previous draw but not by the current one.
    pub fn stale(&self) -> Vec<u32> {
        self.old
            .iter()
            .copied()
            .filter(|id| !self.new.contains(id))
            .collect()
    }

    /// The ids used by the current draw.
    pub fn current(&self) -> &[u32] {
        &self.new
    }

    /// Ends the current draw: its ids become the baseline of the next one.
    pub fn finish(&mut self) {
        self.old = std::mem::take(&mut self.new);
    }

    /// Forgets both lists.
    pub fn reset(&mut self) {
        self.new.clear();
        self.old.clear();
    }
}

/// The slots used by the draw being prepared.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    pub attribs: IdList,
    pub texture_units: IdList,
}

/// The cached device state.
#[derive(Debug, Clone)]
pub struct RenderContext {
    // --- Rasterizer ---
    pub wireframe: Option<bool>,
    pub line_width: Option<f32>,
    pub cull_enabled: Option<bool>,
    pub cull_face: Option<u32>,
    pub polygon_offset_enabled: Option<bool>,
    pub polygon_offset: Option<(f32, f32)>,
    pub scissor_enabled: Option<bool>,
    pub scissor: Option<Rect>,
    pub viewport: Option<Rect>,
    pub alpha_to_coverage: Option<bool>,

    // --- Depth and stencil ---
    pub depth_test: Option<bool>,
    pub depth_func: Option<u32>,
    pub depth_write: Option<bool>,
    pub depth_range: Option<(f32, f32)>,
    pub stencil_test: Option<bool>,
    pub stencil_front_ops: Option<(u32, u32, u32)>,
    pub stencil_back_ops: Option<(u32, u32, u32)>,
    pub stencil_front_func: Option<u32>,
    pub stencil_back_func: Option<u32>,

    // --- Output merger ---
    pub color_write: Option<bool>,
    pub blend_enabled: Option<bool>,
    pub blend_func: Option<(u32, u32)>,
    pub clear_color: Option<LinearRgba>,
    pub framebuffer_srgb: Option<bool>,

    // --- Bindings ---
    pub program: Option<u32>,
    pub array_buffer: Option<u32>,
    pub element_buffer: Option<u32>,
    pub vertex_array: Option<u32>,
    pub framebuffer: Option<u32>,
    pub renderbuffer: Option<u32>,
    pub draw_buffers: Option<Vec<u32>>,
    pub read_buffer: Option<u32>,
    pub active_texture_unit: Option<u32>,
    pub textures: [Option<u32>; MAX_TEXTURE_UNITS],
    pub attribs: [AttribSlot; MAX_VERTEX_ATTRIBS],

    /// Sampling parameters per native texture. Texture parameters belong to the
    /// texture object, so this survives [`RenderContext::reset`].
    pub samplers: HashMap<u32, SamplerCache>,

    pub active: ActiveSet,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            wireframe: None,
            line_width: None,
            cull_enabled: None,
            cull_face: None,
            polygon_offset_enabled: None,
            polygon_offset: None,
            scissor_enabled: None,
            scissor: None,
            viewport: None,
            alpha_to_coverage: None,
            depth_test: None,
            depth_func: None,
            depth_write: None,
            depth_range: None,
            stencil_test: None,
            stencil_front_ops: None,
            stencil_back_ops: None,
            stencil_front_func: None,
            stencil_back_func: None,
            color_write: None,
            blend_enabled: None,
            blend_func: None,
            clear_color: None,
            framebuffer_srgb: None,
            program: None,
            array_buffer: None,
            element_buffer: None,
            vertex_array: None,
            framebuffer: None,
            renderbuffer: None,
            draw_buffers: None,
            read_buffer: None,
            active_texture_unit: None,
            textures: [None; MAX_TEXTURE_UNITS],
            attribs: [AttribSlot::default(); MAX_VERTEX_ATTRIBS],
            samplers: HashMap::new(),
            active: ActiveSet::default(),
        }
    }
}

impl RenderContext {
    /// Marks every device-wide field as unknown.
    pub fn reset(&mut self) {
        let samplers = std::mem::take(&mut self.samplers);
        *self = Self {
            samplers,
            ..Self::default()
        };
    }

    /// Forgets every cached reference to a deleted native buffer.
    pub fn forget_buffer(&mut self, name: u32) {
        if self.array_buffer == Some(name) {
            self.array_buffer = None;
        }
        if self.element_buffer == Some(name) {
            self.element_buffer = None;
        }
        for slot in &mut self.attribs {
            if slot.buffer == Some(name) {
                slot.buffer = None;
            }
        }
    }

    /// Forgets every cached reference to a deleted native texture.
    pub fn forget_texture(&mut self, name: u32) {
        for unit in &mut self.textures {
            if *unit == Some(name) {
                *unit = None;
            }
        }
        self.samplers.remove(&name);
    }

    /// Forgets the cached program if it is the deleted one.
    pub fn forget_program(&mut self, name: u32) {
        if self.program == Some(name) {
            self.program = None;
        }
    }

    /// Forgets the cached framebuffer if it is the deleted one.
    pub fn forget_framebuffer(&mut self, name: u32) {
        if self.framebuffer == Some(name) {
            self.framebuffer = None;
        }
    }

    /// Forgets the cached renderbuffer if it is the deleted one.
    pub fn forget_renderbuffer(&mut self, name: u32) {
        if self.renderbuffer == Some(name) {
            self.renderbuffer = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_texture_parameters() {
        let mut ctx = RenderContext {
            depth_test: Some(true),
            program: Some(3),
            ..Default::default()
        };
        ctx.samplers.insert(7, SamplerCache::default());
        ctx.reset();
        assert_eq!(ctx.depth_test, None);
        assert_eq!(ctx.program, None);
        assert!(ctx.samplers.contains_key(&7));
    }

    #[test]
    fn forget_texture_clears_units_and_samplers() {
        let mut ctx = RenderContext::default();
        ctx.textures[0] = Some(5);
        ctx.textures[3] = Some(5);
        ctx.textures[4] = Some(6);
        ctx.samplers.insert(5, SamplerCache::default());
        ctx.forget_texture(5);
        assert_eq!(ctx.textures[0], None);
        assert_eq!(ctx.textures[3], None);
        assert_eq!(ctx.textures[4], Some(6));
        assert!(ctx.samplers.is_empty());
    }

    #[test]
    fn id_list_reports_stale_slots() {
        let mut list = IdList::default();
        assert!(list.move_to_new(0));
        assert!(list.move_to_new(1));
        list.finish();

        assert!(!list.move_to_new(1));
        assert!(list.move_to_new(2));
        assert_eq!(list.stale(), vec![0]);
        assert_eq!(list.current(), &[1, 2]);
        list.finish();
        assert_eq!(list.stale(), vec![1, 2]);
    }
}
