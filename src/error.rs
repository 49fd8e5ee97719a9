//! Service error taxonomy
//!
//! Every error is local to one operation; none leaves the inventory in a
//! partially mutated state. Not-found removal is a boolean outcome, not
//! an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The upload was not a decodable image. Nothing was mutated.
    #[error("invalid or corrupted image payload")]
    InvalidImage(#[source] image::ImageError),

    /// A manual-save payload failed validation. Nothing was mutated.
    #[error(transparent)]
    Validation(#[from] fridgescan_core::Error),

    /// The detection strategy failed; this scan only.
    #[error("detection failed")]
    Detection(#[source] fridgescan_cv::CvError),

    /// Detection missed its deadline; the scan is abandoned.
    #[error("detection timed out")]
    DetectionTimeout,

    /// The blocking detection task panicked or was cancelled.
    #[error("detection worker failed")]
    Worker(#[from] tokio::task::JoinError),

    #[error("confidence threshold must be between {min} and 1.0, got {value}")]
    ThresholdOutOfRange { value: f32, min: f32 },

    /// The detection worker pool is shut down.
    #[error("detection worker pool is closed")]
    PoolClosed,
}
