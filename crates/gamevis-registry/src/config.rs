//! Registry configuration

use serde::{Deserialize, Serialize};

/// Range checking applied to interactive color input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputValidation {
    /// Only the blue channel is range-checked; red and green are taken as typed
    #[default]
    Legacy,
    /// Every channel must be within 0-255
    Symmetric,
}

/// Registry configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Reference frame stamped on every cloud and marker
    pub frame_id: String,
    /// Appended to the entity id to name its points topic
    pub points_suffix: String,
    /// Appended to the entity id to name its marker topic
    pub marker_suffix: String,
    /// Messages retained per topic for late joiners
    pub history_depth: usize,
    /// Marker namespace shared by all environments
    pub environment_namespace: String,
    pub input_validation: InputValidation,
    /// Fixed seed for random colors (entropy-seeded when absent)
    pub rng_seed: Option<u64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            frame_id: "map".to_string(),
            points_suffix: "/points".to_string(),
            marker_suffix: "/marker".to_string(),
            history_depth: 10,
            environment_namespace: "environment".to_string(),
            input_validation: InputValidation::Legacy,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VisualizerConfig =
            serde_json::from_str(r#"{ "frame_id": "world", "input_validation": "symmetric" }"#).unwrap();
        assert_eq!(config.frame_id, "world");
        assert_eq!(config.input_validation, InputValidation::Symmetric);
        assert_eq!(config.history_depth, 10);
        assert_eq!(config.points_suffix, "/points");
        assert_eq!(config.rng_seed, None);
    }
}
