//! gamevis Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout gamevis:
//! - Entity identifiers and kinds (EntityId, EntityKind)
//! - Color triples and marker colors
//! - Pose geometry (Position3D, Orientation, Scale3D)
//! - Timestamps and clocks
//! - The shared error type

pub mod id;
pub mod color;
pub mod geometry;
pub mod time;
pub mod error;

pub use id::*;
pub use color::*;
pub use geometry::*;
pub use time::*;
pub use error::*;
