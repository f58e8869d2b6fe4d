//! Ink Card - procedural ink branches spreading across a name card
//!
//! Core modules:
//! - `sim`: Deterministic growth simulation (branches, splats, glyph reveal)
//! - `surface`: The three drawing primitives the simulation needs
//! - `painter`: Paints a simulation frame onto any surface
//! - `frame`: Fixed-timestep frame scheduling
//! - `card`: Ties simulation, scheduling and input together for a host
//! - `renderer`: WebGPU backend
//! - `settings`: Presets and host overrides

pub mod card;
pub mod frame;
pub mod painter;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod surface;

pub use card::InkCard;
pub use settings::{Preset, Settings};

use glam::Vec2;

/// Timing constants
pub mod consts {
    /// Fixed simulation timestep (one ink tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted before clamping (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// True when both components are finite
#[inline]
pub fn is_finite_point(p: Vec2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
