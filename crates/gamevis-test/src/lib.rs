//! gamevis Test Harness
//!
//! This crate provides:
//! - A deterministic registry harness (in-process bus, manual clock,
//!   scripted color input, seeded randomness)
//! - Fixture clouds
//! - End-to-end registry scenarios

pub mod harness;

#[cfg(test)]
mod scenarios;

pub use harness::*;
