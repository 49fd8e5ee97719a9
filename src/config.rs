//! Runtime configuration

use fridgescan_cv::DetectionConfig;
use std::time::Duration;

/// Process configuration, assembled from defaults and environment
/// overrides.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub detection: DetectionConfig,
    /// Window during which repeat detections of a label are ignored.
    pub cooldown_duration: Duration,
    /// Deadline for one detection pass.
    pub detect_timeout: Duration,
    /// Size of the blocking detection worker pool.
    pub max_concurrent_detections: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            cooldown_duration: Duration::from_secs_f32(2.0),
            detect_timeout: Duration::from_secs(30),
            max_concurrent_detections: num_cpus::get(),
        }
    }
}

impl ScannerConfig {
    /// Defaults, then `COOLDOWN_DURATION` and `DETECTION_TIMEOUT` (both
    /// in seconds) plus the detection-level environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            detection: DetectionConfig::from_env(),
            ..Self::default()
        };
        if let Some(secs) = env_seconds("COOLDOWN_DURATION") {
            config.cooldown_duration = Duration::from_secs_f32(secs);
        }
        if let Some(secs) = env_seconds("DETECTION_TIMEOUT") {
            config.detect_timeout = Duration::from_secs_f32(secs);
        }
        config
    }
}

fn env_seconds(name: &str) -> Option<f32> {
    let value: f32 = std::env::var(name).ok()?.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
