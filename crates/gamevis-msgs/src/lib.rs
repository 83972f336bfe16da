//! gamevis Messages - what gets sent on visualization channels
//!
//! This crate implements:
//! - Message header (reference frame + stamp)
//! - Mesh marker descriptors
//! - Point cloud frames and their binary wire format

pub mod header;
pub mod marker;
pub mod cloud;

pub use header::*;
pub use marker::*;
pub use cloud::*;
