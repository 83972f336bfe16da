//! gamevis Cloud - decoded point clouds
//!
//! Every point carries a position and an RGB color. Clouds arrive from
//! three kinds of sources (PCD files, wire frames, in-memory clouds) and all
//! normalize to [`PointCloud`].

pub mod point;
pub mod convert;
pub mod pcd;
pub mod source;

pub use point::*;
pub use convert::*;
pub use pcd::*;
pub use source::*;
