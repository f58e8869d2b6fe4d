//! Tessellation of the surface primitives into triangles

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::f32::consts::TAU;

use crate::surface::{Color, Stroke, Surface};

/// 2D vertex in surface pixels with a straight-alpha colour
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Segments for a circle of `radius` pixels
fn circle_segments(radius: f32) -> u32 {
    ((radius * 0.75).ceil() as u32).clamp(8, 48)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a quad whose half-width tapers from `from` to `to`
pub fn tapered_line(stroke: &Stroke) -> Vec<Vertex> {
    let dir = (stroke.to - stroke.from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = Vec2::new(-dir.y, dir.x);

    let a1 = stroke.from + perp * stroke.start_width;
    let b1 = stroke.from - perp * stroke.start_width;
    let a2 = stroke.to + perp * stroke.end_width;
    let b2 = stroke.to - perp * stroke.end_width;
    let c = stroke.color;

    vec![
        Vertex::new(a1.x, a1.y, c),
        Vertex::new(b1.x, b1.y, c),
        Vertex::new(a2.x, a2.y, c),
        Vertex::new(a2.x, a2.y, c),
        Vertex::new(b1.x, b1.y, c),
        Vertex::new(b2.x, b2.y, c),
    ]
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: Color) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Triangle list built up from surface calls, in pixel space
#[derive(Debug, Clone, Default)]
pub struct ShapeBatch {
    vertices: Vec<Vertex>,
    size: Vec2,
}

impl ShapeBatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            vertices: Vec::new(),
            size: Vec2::new(width, height),
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl Surface for ShapeBatch {
    fn stroke_line(&mut self, stroke: &Stroke) {
        if stroke.color[3] > 0.0 {
            self.vertices.extend(tapered_line(stroke));
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius > 0.0 && color[3] > 0.0 {
            self.vertices
                .extend(circle(center, radius, color, circle_segments(radius)));
        }
    }

    fn wash(&mut self, color: Color) {
        self.vertices.extend(rect(Vec2::ZERO, self.size, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Color = [0.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_tapered_line_widths() {
        let vertices = tapered_line(&Stroke {
            from: Vec2::new(0.0, 0.0),
            to: Vec2::new(10.0, 0.0),
            start_width: 2.0,
            end_width: 0.5,
            color: INK,
        });
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].position, [0.0, 2.0]);
        assert_eq!(vertices[1].position, [0.0, -2.0]);
        assert_eq!(vertices[2].position, [10.0, 0.5]);
        assert_eq!(vertices[5].position, [10.0, -0.5]);
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let stroke = Stroke {
            from: Vec2::ONE,
            to: Vec2::ONE,
            start_width: 1.0,
            end_width: 1.0,
            color: INK,
        };
        assert!(tapered_line(&stroke).is_empty());
    }

    #[test]
    fn test_circle_segments_scale_with_radius() {
        assert_eq!(circle_segments(1.0), 8);
        assert_eq!(circle_segments(40.0), 30);
        assert_eq!(circle_segments(1000.0), 48);
        assert_eq!(circle(Vec2::ZERO, 5.0, INK, 12).len(), 36);
    }

    #[test]
    fn test_batch_collects_surface_calls() {
        let mut batch = ShapeBatch::new(800.0, 600.0);
        batch.wash([1.0, 1.0, 1.0, 0.01]);
        assert_eq!(batch.vertices().len(), 6);
        assert_eq!(batch.vertices()[5].position, [800.0, 600.0]);

        // Invisible shapes add nothing
        batch.fill_circle(Vec2::ZERO, 0.0, INK);
        batch.fill_circle(Vec2::ZERO, 4.0, [0.0; 4]);
        assert_eq!(batch.vertices().len(), 6);

        batch.fill_circle(Vec2::ZERO, 4.0, INK);
        assert_eq!(batch.vertices().len(), 6 + 8 * 3);
        batch.clear();
        assert!(batch.is_empty());
    }
}
