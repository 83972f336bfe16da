//! gamevis Runtime - node wiring
//!
//! Assembles a bus, a clock and the visual registry into one node, installs
//! the tracing subscriber and loads configuration from JSON.

pub mod config;
pub mod telemetry;
pub mod node;

pub use config::*;
pub use telemetry::*;
pub use node::*;
