//! gamevis Registry - the entity visual registry
//!
//! Keeps one visual state per environment and per player: a fixed color, the
//! latest point cloud, a mesh marker and the two channels those are sent on.
//!
//! Environment points are replaced on every update; player points accrete.

pub mod config;
pub mod color;
pub mod prompt;
pub mod visual;
pub mod visualizer;

pub use config::*;
pub use color::*;
pub use prompt::*;
pub use visual::*;
pub use visualizer::*;
