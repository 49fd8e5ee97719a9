//! Detection configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunables for the detection strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum class score for a neural candidate to be considered.
    pub confidence_threshold: f32,
    /// IoU above which an overlapping candidate is suppressed.
    pub nms_threshold: f32,
    /// Frames with a longer side above this are downscaled before
    /// detection, preserving aspect ratio.
    pub max_input_side: u32,
    pub artifacts: ModelArtifacts,
}

/// Files the neural backend needs on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub weights: PathBuf,
    pub network_config: PathBuf,
    /// Newline-separated class vocabulary, one label per line.
    pub class_names: PathBuf,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            nms_threshold: 0.4,
            max_input_side: 1024,
            artifacts: ModelArtifacts {
                weights: "yolov3.weights".into(),
                network_config: "yolov3.cfg".into(),
                class_names: "coco.names".into(),
            },
        }
    }
}

impl DetectionConfig {
    /// Defaults overridden by `CONFIDENCE_THRESHOLD`, `NMS_THRESHOLD`,
    /// `MODEL_WEIGHTS`, `MODEL_CONFIG` and `MODEL_CLASSES` where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_f32("CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = value;
        }
        if let Some(value) = env_f32("NMS_THRESHOLD") {
            config.nms_threshold = value;
        }
        if let Ok(path) = std::env::var("MODEL_WEIGHTS") {
            config.artifacts.weights = path.into();
        }
        if let Ok(path) = std::env::var("MODEL_CONFIG") {
            config.artifacts.network_config = path.into();
        }
        if let Ok(path) = std::env::var("MODEL_CLASSES") {
            config.artifacts.class_names = path.into();
        }
        config
    }
}

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service_tunables() {
        let config = DetectionConfig::default();
        assert_eq!(config.confidence_threshold, 0.3);
        assert_eq!(config.nms_threshold, 0.4);
        assert_eq!(config.max_input_side, 1024);
    }
}
