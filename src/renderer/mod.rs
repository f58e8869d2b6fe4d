//! WebGPU rendering module
//!
//! `ShapeBatch` turns painter calls into triangles; `RenderState` draws them
//! into a persistent texture and presents it.

pub mod pipeline;
pub mod shapes;

pub use pipeline::RenderState;
pub use shapes::{ShapeBatch, Vertex};
