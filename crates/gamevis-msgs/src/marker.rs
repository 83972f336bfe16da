//! Mesh marker descriptor
//!
//! One marker per entity: a renderable proxy placed at the entity's pose.
//! A zero lifetime means the marker never expires.

use std::time::Duration;

use gamevis_core::{ColorRgba, Pose, Position3D, Scale3D, Stamp};
use serde::{Deserialize, Serialize};

use crate::Header;

/// Marker shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MarkerKind {
    Arrow = 0,
    Cube = 1,
    Sphere = 2,
    Cylinder = 3,
    LineStrip = 4,
    Points = 8,
    Text = 9,
    #[default]
    MeshResource = 10,
}

/// What the renderer should do with the marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MarkerAction {
    #[default]
    Add = 0,
    Modify = 1,
    Delete = 2,
    /// Remove every marker previously sent on the channel
    DeleteAll = 3,
}

/// Marker descriptor sent on an entity's marker channel
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Marker {
    pub header: Header,
    pub ns: String,
    pub id: i32,
    pub kind: MarkerKind,
    pub action: MarkerAction,
    pub pose: Pose,
    pub scale: Scale3D,
    pub color: ColorRgba,
    /// Zero = never expires
    pub lifetime: Duration,
    pub mesh_resource: String,
    pub mesh_use_embedded_materials: bool,
}

impl Marker {
    /// Mesh marker at the origin: identity orientation, unit scale, infinite lifetime
    pub fn mesh(frame_id: impl Into<String>, ns: impl Into<String>, mesh_resource: impl Into<String>) -> Self {
        Marker {
            header: Header::new(frame_id, Stamp::ZERO),
            ns: ns.into(),
            id: 0,
            kind: MarkerKind::MeshResource,
            action: MarkerAction::Add,
            pose: Pose::default(),
            scale: Scale3D::unit(),
            color: ColorRgba::TRANSPARENT,
            lifetime: Duration::ZERO,
            mesh_resource: mesh_resource.into(),
            mesh_use_embedded_materials: false,
        }
    }

    /// Clear command for everything on a channel
    pub fn delete_all(frame_id: impl Into<String>, stamp: Stamp) -> Self {
        Marker {
            header: Header::new(frame_id, stamp),
            action: MarkerAction::DeleteAll,
            ..Default::default()
        }
    }

    pub fn set_position(&mut self, position: Position3D) {
        self.pose.position = position;
    }

    pub fn is_persistent(&self) -> bool {
        self.lifetime.is_zero()
    }
}
