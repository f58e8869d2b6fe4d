//! Deterministic growth simulation
//!
//! All ink growth logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of the live list)
//! - No rendering or platform dependencies

pub mod branch;
pub mod reveal;
pub mod splat;
pub mod state;
pub mod tick;

pub use branch::{Blossom, BranchNode, GrowthContext, StopRule};
pub use reveal::{GlyphRegion, Rect, RevealDetector};
pub use splat::{InkSplatEmitter, Splat};
pub use state::GrowthSimulator;
pub use tick::{TickInput, TickStats};
