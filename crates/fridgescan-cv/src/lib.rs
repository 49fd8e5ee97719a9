//! Detection strategies for fridge scans
//!
//! Two interchangeable producers of [`RawDetection`] lists: a neural
//! strategy over an external region-scoring backend, and a color-range
//! segmentation fallback for when no backend is available. Both feed the
//! reconciliation core in `fridgescan-core`.

pub mod config;
pub mod nms;
pub mod strategy;

pub use config::{DetectionConfig, ModelArtifacts};
pub use strategy::heuristic::ColorRangeDetector;
pub use strategy::neural::{NeuralDetector, RegionProposal, RegionScorer, ScorerLoader};
pub use strategy::{select_strategy, Detect, DetectOptions, DetectionMethod};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CvError {
    #[error("model artifact not found: {0:?}")]
    MissingArtifact(PathBuf),

    #[error("failed to read class names from {path:?}")]
    ClassNames {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("class names file {0:?} contains no classes")]
    EmptyClassNames(PathBuf),

    /// Failure inside the external scoring backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
