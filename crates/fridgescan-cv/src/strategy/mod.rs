//! Detection strategy selection
//!
//! Exactly two strategies share the [`Detect`] contract: the neural one
//! over an external scoring backend, and the color-segmentation fallback.
//! Selection happens once at startup and is cached by the caller for the
//! process lifetime.

pub mod heuristic;
pub mod neural;

use self::heuristic::ColorRangeDetector;
use self::neural::{NeuralDetector, ScorerLoader};
use crate::config::DetectionConfig;
use crate::CvError;
use fridgescan_core::RawDetection;
use image::imageops::FilterType;
use image::RgbImage;
use serde::Serialize;
use tracing::{info, warn};

/// Which strategy produced a scan's detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    Neural,
    ColorSegmentation,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Neural => "neural",
            DetectionMethod::ColorSegmentation => "color-segmentation",
        }
    }
}

/// Per-scan tunables, read at detection time so threshold updates take
/// effect without rebuilding the strategy.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
}

impl From<&DetectionConfig> for DetectOptions {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            nms_threshold: config.nms_threshold,
        }
    }
}

/// A producer of per-frame detections.
pub trait Detect: Send + Sync {
    fn detect(&self, frame: &RgbImage, opts: DetectOptions) -> Result<Vec<RawDetection>, CvError>;

    fn method(&self) -> DetectionMethod;

    /// Number of labels the strategy can emit.
    fn class_count(&self) -> usize;
}

/// One-shot startup selection.
///
/// Tries the neural strategy when a scorer loader is available; any
/// failure there (missing artifacts, unreadable class names, backend load
/// error) falls back to color segmentation. Never fails.
pub fn select_strategy(
    config: &DetectionConfig,
    loader: Option<&dyn ScorerLoader>,
) -> Box<dyn Detect> {
    if let Some(loader) = loader {
        match NeuralDetector::from_artifacts(&config.artifacts, config.max_input_side, loader) {
            Ok(detector) => {
                info!(classes = detector.class_count(), "neural scoring backend loaded");
                return Box::new(detector);
            }
            Err(error) => {
                warn!(%error, "neural backend unavailable, falling back to color segmentation");
            }
        }
    } else {
        info!("no scoring backend wired in, using color segmentation");
    }
    Box::new(ColorRangeDetector::new(config.max_input_side))
}

/// Downscale a frame whose longer side exceeds `max_side`, preserving
/// aspect ratio. Returns `None` when the frame is already small enough.
pub(crate) fn scaled_to_fit(frame: &RgbImage, max_side: u32) -> Option<RgbImage> {
    let (width, height) = frame.dimensions();
    let longer = width.max(height);
    if longer <= max_side {
        return None;
    }

    let (new_width, new_height) = if width >= height {
        let scaled = (height as f32 * max_side as f32 / width as f32).round() as u32;
        (max_side, scaled.max(1))
    } else {
        let scaled = (width as f32 * max_side as f32 / height as f32).round() as u32;
        (scaled.max(1), max_side)
    };

    Some(image::imageops::resize(
        frame, new_width, new_height, FilterType::Triangle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_frames_are_left_alone() {
        let frame = RgbImage::new(640, 480);
        assert!(scaled_to_fit(&frame, 1024).is_none());
    }

    #[test]
    fn oversized_frames_shrink_to_the_cap() {
        let frame = RgbImage::new(2048, 1024);
        let resized = scaled_to_fit(&frame, 1024).unwrap();
        assert_eq!(resized.dimensions(), (1024, 512));

        let portrait = RgbImage::new(512, 4096);
        let resized = scaled_to_fit(&portrait, 1024).unwrap();
        assert_eq!(resized.dimensions(), (128, 1024));
    }

    #[test]
    fn selection_without_a_loader_uses_color_segmentation() {
        let strategy = select_strategy(&DetectionConfig::default(), None);
        assert_eq!(strategy.method(), DetectionMethod::ColorSegmentation);
    }

    #[test]
    fn selection_with_missing_artifacts_falls_back() {
        struct NeverLoads;
        impl ScorerLoader for NeverLoads {
            fn load(
                &self,
                _artifacts: &crate::config::ModelArtifacts,
            ) -> Result<Box<dyn neural::RegionScorer>, CvError> {
                unreachable!("artifact presence check fails first")
            }
        }

        // Default artifact paths do not exist in the test environment.
        let strategy = select_strategy(&DetectionConfig::default(), Some(&NeverLoads));
        assert_eq!(strategy.method(), DetectionMethod::ColorSegmentation);
    }
}
