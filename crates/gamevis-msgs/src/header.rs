//! Message header shared by markers and point cloud frames

use gamevis_core::Stamp;
use serde::{Deserialize, Serialize};

/// Reference frame tag + timestamp
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub frame_id: String,
    pub stamp: Stamp,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp: Stamp) -> Self {
        Header {
            frame_id: frame_id.into(),
            stamp,
        }
    }
}
