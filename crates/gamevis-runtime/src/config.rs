//! Node configuration

use std::path::Path;

use gamevis_core::{VisError, VisResult};
use gamevis_registry::VisualizerConfig;
use serde::{Deserialize, Serialize};

use crate::TelemetryConfig;

/// Node configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub visualizer: VisualizerConfig,
    pub telemetry: TelemetryConfig,
}

impl NodeConfig {
    pub fn from_json_str(json: &str) -> VisResult<Self> {
        serde_json::from_str(json).map_err(|e| VisError::Config(e.to_string()))
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> VisResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> VisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisError::Config(e.to_string()))
    }
}
