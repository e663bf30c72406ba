//! Generation constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Constants are split into submodules by domain for easier navigation.

mod generation;
mod pathfinding;
mod triangulation;

pub use generation::*;
pub use pathfinding::*;
pub use triangulation::*;
