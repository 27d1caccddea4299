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

//! Integration tests for draw dispatch: attribute binding, indexed, hybrid and
//! instanced draws.

mod common;

use glint_core::renderer::api::{
    BufferType, Mesh, Mode, ModeStart, RendererConfig, Usage, VertexBuffer, VertexFormat,
};
use glint_core::renderer::RenderError;
use glint_core::Renderer;
use glint_infra::graphics::gl::enums as gl;
use glint_infra::{GlCall, GlRenderer, RecordingDevice};

fn draw_calls(renderer: &GlRenderer<RecordingDevice>) -> Vec<GlCall> {
    renderer
        .device()
        .calls()
        .iter()
        .filter(|call| call.is_draw())
        .cloned()
        .collect()
}

fn bound_renderer(device: RecordingDevice) -> GlRenderer<RecordingDevice> {
    let mut renderer = common::renderer_with(device, RendererConfig::default());
    let mut shader = common::color_shader();
    renderer.set_shader(&mut shader).unwrap();
    renderer.device_mut().clear_calls();
    renderer
}

fn colors(vertices: usize) -> VertexBuffer {
    VertexBuffer::from_slice(
        BufferType::Color,
        Usage::Static,
        4,
        VertexFormat::UnsignedByte,
        &vec![0xFFu8; vertices * 4],
    )
    .with_normalized(true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Plain draws
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_array_draw_covers_every_vertex() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mesh = common::triangle_mesh(3);
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();

    assert_eq!(
        draw_calls(&renderer),
        vec![GlCall::DrawArrays {
            mode: gl::TRIANGLES,
            first: 0,
            count: 3
        }]
    );
    let stats = renderer.statistics();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.meshes_drawn, 1);
    assert_eq!(stats.vertices, 3);
}

#[test]
fn test_indexed_draw_uses_the_index_format() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mesh = common::triangle_mesh(4).with_buffer(common::indices(&[0, 1, 2, 2, 1, 3]));
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();

    assert_eq!(
        draw_calls(&renderer),
        vec![GlCall::DrawElements {
            mode: gl::TRIANGLES,
            count: 6,
            index_type: gl::UNSIGNED_SHORT,
            offset: 0
        }]
    );
}

#[test]
fn test_empty_meshes_draw_nothing() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    renderer
        .render_mesh(&Mesh::new(Mode::Triangles), 0, 1, &[])
        .unwrap();
    renderer
        .render_mesh(&common::triangle_mesh(3), 0, 0, &[])
        .unwrap();
    assert!(renderer.device().calls().is_empty());
}

#[test]
fn test_drawing_without_a_shader_is_rejected() {
    let mut renderer = common::renderer();
    let mesh = common::triangle_mesh(3);
    assert!(matches!(
        renderer.render_mesh(&mesh, 0, 1, &[]),
        Err(RenderError::PreconditionViolation(_))
    ));
    assert!(draw_calls(&renderer).is_empty());
}

#[test]
fn test_float_index_buffers_are_rejected() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let bad_indices = VertexBuffer::from_slice(
        BufferType::Index,
        Usage::Static,
        1,
        VertexFormat::Float,
        &[0.0f32, 1.0, 2.0],
    );
    let mesh = common::triangle_mesh(3).with_buffer(bad_indices);
    assert!(matches!(
        renderer.render_mesh(&mesh, 0, 1, &[]),
        Err(RenderError::PreconditionViolation(_))
    ));
    assert!(renderer.device().calls().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Attributes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_attributes_are_bound_once() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mesh = common::triangle_mesh(3).with_buffer(colors(3));
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::VertexAttribPointer { .. })),
        2
    );

    renderer.device_mut().clear_calls();
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();
    let calls = renderer.device().calls();
    assert_eq!(calls.len(), 1, "only the draw is issued again: {calls:?}");
}

#[test]
fn test_unused_attributes_are_disabled() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let colored = common::triangle_mesh(3).with_buffer(colors(3));
    renderer.render_mesh(&colored, 0, 1, &[]).unwrap();

    renderer.device_mut().clear_calls();
    renderer
        .render_mesh(&common::triangle_mesh(3), 0, 1, &[])
        .unwrap();
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::DisableVertexAttribArray(_))),
        1
    );
}

#[test]
fn test_interleaved_buffers_feed_every_attribute() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    // Three vertices of position (3 floats) and colour (4 bytes).
    let interleaved = VertexBuffer::from_slice(
        BufferType::InterleavedData,
        Usage::Static,
        1,
        VertexFormat::Float,
        &[0.0f32; 12],
    );
    let position = VertexBuffer::new(BufferType::Position, Usage::Static, 3, VertexFormat::Float, Vec::new())
        .with_layout(16, 0);
    let color = VertexBuffer::new(BufferType::Color, Usage::Static, 4, VertexFormat::UnsignedByte, Vec::new())
        .with_layout(16, 12)
        .with_normalized(true);
    let mesh = Mesh::new(Mode::Triangles)
        .with_buffer(interleaved)
        .with_buffer(position)
        .with_buffer(color);

    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();
    let pointers: Vec<(i32, i32)> = renderer
        .device()
        .calls()
        .iter()
        .filter_map(|call| match call {
            GlCall::VertexAttribPointer { stride, offset, .. } => Some((*stride, *offset)),
            _ => None,
        })
        .collect();
    assert_eq!(pointers.len(), 2);
    assert!(pointers.contains(&(16, 0)));
    assert!(pointers.contains(&(16, 12)));
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::BufferData { .. })),
        1,
        "only the interleaved buffer is uploaded"
    );
    assert_eq!(
        draw_calls(&renderer),
        vec![GlCall::DrawArrays {
            mode: gl::TRIANGLES,
            first: 0,
            count: 3
        }]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Hybrid and LOD
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hybrid_mesh_draws_each_range_with_its_topology() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mut mesh = common::triangle_mesh(12);
    mesh.set_hybrid(
        vec![3, 4, 5],
        ModeStart {
            list: 0,
            strip: 1,
            fan: 2,
        },
    );
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();

    assert_eq!(
        draw_calls(&renderer),
        vec![
            GlCall::DrawArrays {
                mode: gl::TRIANGLES,
                first: 0,
                count: 3
            },
            GlCall::DrawArrays {
                mode: gl::TRIANGLE_STRIP,
                first: 3,
                count: 4
            },
            GlCall::DrawArrays {
                mode: gl::TRIANGLE_FAN,
                first: 7,
                count: 5
            },
        ]
    );
    assert_eq!(renderer.statistics().draw_calls, 3);
}

#[test]
fn test_indexed_hybrid_ranges_advance_by_index_size() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mut mesh = common::triangle_mesh(6).with_buffer(common::indices(&[0, 1, 2, 3, 4, 5, 0]));
    mesh.set_hybrid(
        vec![3, 4],
        ModeStart {
            list: 0,
            strip: 1,
            fan: 2,
        },
    );
    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();

    let offsets: Vec<i32> = draw_calls(&renderer)
        .iter()
        .filter_map(|call| match call {
            GlCall::DrawElements { offset, .. } => Some(*offset),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0, 6]);
}

#[test]
fn test_lod_level_replaces_the_index_buffer() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mut mesh = common::triangle_mesh(4);
    mesh.set_lod_levels(vec![
        common::indices(&[0, 1, 2, 2, 1, 3]),
        common::indices(&[0, 1, 2]),
    ]);

    renderer.render_mesh(&mesh, 1, 1, &[]).unwrap();
    assert!(matches!(
        draw_calls(&renderer).as_slice(),
        [GlCall::DrawElements { count: 3, .. }]
    ));

    assert!(matches!(
        renderer.render_mesh(&mesh, 2, 1, &[]),
        Err(RenderError::PreconditionViolation(_))
    ));
}

#[test]
fn test_line_width_is_only_sent_for_lines() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mut lines = Mesh::new(Mode::Lines).with_buffer(common::positions(2));
    lines.set_line_width(3.0);
    let mut triangles = common::triangle_mesh(3);
    triangles.set_line_width(5.0);

    renderer.render_mesh(&triangles, 0, 1, &[]).unwrap();
    renderer.render_mesh(&lines, 0, 1, &[]).unwrap();
    renderer.render_mesh(&lines, 0, 1, &[]).unwrap();
    assert_eq!(
        renderer
            .device()
            .count(|call| matches!(call, GlCall::LineWidth(_))),
        1
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Instancing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_instanced_draws_use_the_instanced_entry_points() {
    let mut renderer = bound_renderer(RecordingDevice::new());
    let mesh = common::triangle_mesh(3);
    renderer.render_mesh(&mesh, 0, 4, &[]).unwrap();

    assert_eq!(
        draw_calls(&renderer),
        vec![GlCall::DrawArraysInstanced {
            mode: gl::TRIANGLES,
            first: 0,
            count: 3,
            instances: 4
        }]
    );
    assert_eq!(renderer.statistics().vertices, 12);
}

#[test]
fn test_instancing_without_the_capability_fails_before_any_call() {
    let mut renderer = bound_renderer(RecordingDevice::gl21());
    let mesh = common::triangle_mesh(3);
    assert!(matches!(
        renderer.render_mesh(&mesh, 0, 2, &[]),
        Err(RenderError::UnsupportedOperation(_))
    ));
    assert!(renderer.device().calls().is_empty());

    renderer.render_mesh(&mesh, 0, 1, &[]).unwrap();
    assert_eq!(draw_calls(&renderer).len(), 1);
}
