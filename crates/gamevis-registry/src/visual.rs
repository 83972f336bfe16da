//! Visual State - everything drawn for one entity
//!
//! Channel handles are bound when the state is created and released when it
//! is dropped.

use gamevis_cloud::PointCloud;
use gamevis_core::{ColorTriple, EntityId, EntityKind, Stamp, VisResult};
use gamevis_msgs::{CloudMessage, Marker};
use gamevis_transport::Channel;

/// Color, cloud, marker and output channels of one environment or player
pub struct VisualState {
    id: EntityId,
    kind: EntityKind,
    color: ColorTriple,
    points: PointCloud,
    marker: Marker,
    points_channel: Box<dyn Channel<CloudMessage>>,
    marker_channel: Box<dyn Channel<Marker>>,
}

impl VisualState {
    pub(crate) fn new(
        id: EntityId,
        kind: EntityKind,
        color: ColorTriple,
        marker: Marker,
        points_channel: Box<dyn Channel<CloudMessage>>,
        marker_channel: Box<dyn Channel<Marker>>,
    ) -> Self {
        VisualState {
            id,
            kind,
            color,
            points: PointCloud::new(),
            marker,
            points_channel,
            marker_channel,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn color(&self) -> ColorTriple {
        self.color
    }

    pub fn points(&self) -> &PointCloud {
        &self.points
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn points_topic(&self) -> &str {
        self.points_channel.topic()
    }

    pub fn marker_topic(&self) -> &str {
        self.marker_channel.topic()
    }

    pub(crate) fn marker_mut(&mut self) -> &mut Marker {
        &mut self.marker
    }

    /// Paint in the entity color and replace the stored cloud
    pub(crate) fn replace_points(&mut self, mut cloud: PointCloud) {
        cloud.paint(self.color);
        self.points = cloud;
    }

    /// Paint in the entity color and append to the stored cloud
    pub(crate) fn accrete_points(&mut self, mut cloud: PointCloud) {
        cloud.paint(self.color);
        self.points.append(&cloud);
    }

    pub(crate) fn publish_points(&self, frame_id: &str, stamp: Stamp) -> VisResult<()> {
        self.points_channel
            .publish(&self.points.to_message(frame_id, stamp)?)
    }

    /// Stamp the marker and send it
    pub(crate) fn publish_marker(&mut self, stamp: Stamp) -> VisResult<()> {
        self.marker.header.stamp = stamp;
        self.marker_channel.publish(&self.marker)
    }

    /// Blank the remote display: empty cloud + delete-all marker.
    /// Stored state is left untouched.
    pub(crate) fn publish_clear(&self, frame_id: &str, stamp: Stamp) -> VisResult<()> {
        self.points_channel
            .publish(&PointCloud::new().to_message(frame_id, stamp)?)?;
        self.marker_channel
            .publish(&Marker::delete_all(frame_id, stamp))
    }
}

impl std::fmt::Debug for VisualState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualState")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("color", &self.color)
            .field("points", &self.points.len())
            .field("points_topic", &self.points_topic())
            .field("marker_topic", &self.marker_topic())
            .finish()
    }
}
