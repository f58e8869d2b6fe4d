//! Drawing surface capability
//!
//! The painter only needs three primitives: a tapered line, a filled circle
//! and a translucent wash over the whole surface. Backends implement
//! `Surface`; tests use `RecordingSurface`.

use glam::Vec2;

/// Straight-alpha RGBA, components 0-1
pub type Color = [f32; 4];

/// A line segment whose width changes linearly from `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Vec2,
    pub to: Vec2,
    /// Half-width at `from`
    pub start_width: f32,
    /// Half-width at `to`
    pub end_width: f32,
    pub color: Color,
}

pub trait Surface {
    fn stroke_line(&mut self, stroke: &Stroke);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Blend `color` over the entire surface
    fn wash(&mut self, color: Color);
}

pub fn rgba(rgb: [f32; 3], alpha: f32) -> Color {
    [rgb[0], rgb[1], rgb[2], alpha.clamp(0.0, 1.0)]
}

/// HSL to RGBA. Hue in degrees, the rest 0-1.
pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let a = a.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l, a];
    }

    fn channel(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        channel(p, q, h + 1.0 / 3.0),
        channel(p, q, h),
        channel(p, q, h - 1.0 / 3.0),
        a,
    ]
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Stroke(Stroke),
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Wash(Color),
}

/// Surface that keeps every call for inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke(_)))
            .count()
    }

    pub fn circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn washes(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Wash(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn stroke_line(&mut self, stroke: &Stroke) {
        self.commands.push(DrawCommand::Stroke(*stroke));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn wash(&mut self, color: Color) {
        self.commands.push(DrawCommand::Wash(color));
    }
}
