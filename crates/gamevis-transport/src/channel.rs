//! Channel seam between the registry and a transport

use gamevis_core::VisResult;
use gamevis_msgs::{CloudMessage, Marker};

use crate::QosProfile;

/// An addressed output stream
pub trait Channel<M>: Send + Sync {
    fn topic(&self) -> &str;

    /// Send one snapshot
    fn publish(&self, msg: &M) -> VisResult<()>;
}

/// Creates the two output channels bound to every entity
pub trait ChannelFactory: Send + Sync {
    fn points_channel(&self, topic: &str, qos: QosProfile) -> VisResult<Box<dyn Channel<CloudMessage>>>;

    fn marker_channel(&self, topic: &str, qos: QosProfile) -> VisResult<Box<dyn Channel<Marker>>>;
}
