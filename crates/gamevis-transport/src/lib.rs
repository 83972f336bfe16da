//! gamevis Transport - where visual snapshots go
//!
//! This crate provides:
//! - QoS profiles (history depth, durability)
//! - The `Channel` / `ChannelFactory` seam the registry publishes through
//! - `LocalBus`, an in-process latched bus with late-joiner replay

pub mod qos;
pub mod channel;
pub mod bus;

pub use qos::*;
pub use channel::*;
pub use bus::{LocalBus, LocalChannel, Subscription};
