//! Where an incoming cloud comes from

use std::path::PathBuf;

use bytes::Bytes;
use gamevis_core::VisResult;
use gamevis_msgs::CloudMessage;
use tracing::debug;

use crate::{read_pcd, PointCloud};

/// One of the accepted point cloud source forms
#[derive(Debug, Clone)]
pub enum CloudSource {
    /// Path to a PCD file on disk
    File(PathBuf),
    /// A framed cloud as received from a channel
    Wire(CloudMessage),
    /// An encoded frame that still has to be decoded
    Encoded(Bytes),
    /// An already decoded cloud
    Decoded(PointCloud),
}

impl CloudSource {
    /// Normalize to a decoded cloud. Decode errors are returned unchanged.
    pub fn into_cloud(self) -> VisResult<PointCloud> {
        match self {
            CloudSource::File(path) => {
                debug!(path = %path.display(), "reading PCD file");
                read_pcd(&path)
            }
            CloudSource::Wire(msg) => PointCloud::from_message(&msg),
            CloudSource::Encoded(bytes) => {
                let msg = CloudMessage::decode(&bytes)?;
                PointCloud::from_message(&msg)
            }
            CloudSource::Decoded(cloud) => Ok(cloud),
        }
    }
}

impl From<PathBuf> for CloudSource {
    fn from(path: PathBuf) -> Self {
        CloudSource::File(path)
    }
}

impl From<&std::path::Path> for CloudSource {
    fn from(path: &std::path::Path) -> Self {
        CloudSource::File(path.to_path_buf())
    }
}

impl From<CloudMessage> for CloudSource {
    fn from(msg: CloudMessage) -> Self {
        CloudSource::Wire(msg)
    }
}

impl From<Bytes> for CloudSource {
    fn from(bytes: Bytes) -> Self {
        CloudSource::Encoded(bytes)
    }
}

impl From<PointCloud> for CloudSource {
    fn from(cloud: PointCloud) -> Self {
        CloudSource::Decoded(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{write_pcd_ascii, PointXyzRgb};
    use gamevis_core::{Stamp, VisError};

    fn cloud() -> PointCloud {
        (0..4).map(|i| PointXyzRgb::new(i as f32, 1.0, 2.0)).collect()
    }

    #[test]
    fn test_all_forms_normalize_to_same_cloud() {
        let expected = cloud();
        let msg = expected.to_message("map", Stamp::ZERO).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.pcd");
        write_pcd_ascii(&expected, std::fs::File::create(&path).unwrap()).unwrap();

        let sources = vec![
            CloudSource::from(path),
            CloudSource::from(msg.clone()),
            CloudSource::from(msg.encode().unwrap()),
            CloudSource::from(expected.clone()),
        ];
        for source in sources {
            assert_eq!(source.into_cloud().unwrap(), expected);
        }
    }

    #[test]
    fn test_decode_errors_propagate() {
        let err = CloudSource::Encoded(Bytes::from_static(b"nope"))
            .into_cloud()
            .unwrap_err();
        assert!(matches!(err, VisError::BufferTooShort { .. }));
    }
}
