//! Pose geometry for markers

use serde::{Deserialize, Serialize};

use crate::{VisError, VisResult};

/// 3D position in the reference frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from the first three components of a slice
    pub fn from_slice(values: &[f32]) -> VisResult<Self> {
        match values {
            [x, y, z, ..] => Ok(Self::new(*x, *y, *z)),
            _ => Err(VisError::InvalidArgument(format!(
                "position needs 3 components, got {}",
                values.len()
            ))),
        }
    }
}

/// Orientation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Per-axis marker scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Scale3D {
    pub const fn unit() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl Default for Scale3D {
    fn default() -> Self {
        Self::unit()
    }
}

/// Position + orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position3D,
    pub orientation: Orientation,
}
