//! Neural detection strategy
//!
//! The network itself is an external collaborator behind [`RegionScorer`]:
//! it turns a frame into per-region class-score vectors, and everything
//! downstream (arg-max, thresholding, suppression, food filtering) lives
//! here.

use crate::config::ModelArtifacts;
use crate::nms;
use crate::strategy::{scaled_to_fit, Detect, DetectOptions, DetectionMethod};
use crate::CvError;
use fridgescan_core::{categories, filter, BoundingBox, RawDetection};
use image::RgbImage;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Class scores the backend produced for one image region.
#[derive(Debug, Clone)]
pub struct RegionProposal {
    /// Region box in pixel coordinates of the (possibly downscaled) frame.
    pub bbox: BoundingBox,
    /// One score per entry of the backend's class vocabulary.
    pub scores: Vec<f32>,
}

/// The external scoring backend.
///
/// Implementations must be deterministic for identical weights and
/// pixels, and side-effect free.
pub trait RegionScorer: Send + Sync {
    fn score_regions(&self, frame: &RgbImage) -> Result<Vec<RegionProposal>, CvError>;
}

/// Constructs a scoring backend from model artifacts on disk.
pub trait ScorerLoader: Send + Sync {
    fn load(&self, artifacts: &ModelArtifacts) -> Result<Box<dyn RegionScorer>, CvError>;
}

/// Detection strategy over a loaded scoring backend.
pub struct NeuralDetector {
    scorer: Box<dyn RegionScorer>,
    class_names: Vec<String>,
    max_input_side: u32,
}

impl NeuralDetector {
    /// Validate that every artifact exists, read the class vocabulary,
    /// and load the backend. Any failure here means the caller should
    /// fall back to color segmentation.
    pub fn from_artifacts(
        artifacts: &ModelArtifacts,
        max_input_side: u32,
        loader: &dyn ScorerLoader,
    ) -> Result<Self, CvError> {
        for path in [
            &artifacts.weights,
            &artifacts.network_config,
            &artifacts.class_names,
        ] {
            if !path.exists() {
                return Err(CvError::MissingArtifact(path.clone()));
            }
        }

        let class_names = read_class_names(&artifacts.class_names)?;
        let scorer = loader.load(artifacts)?;
        Ok(Self::new(scorer, class_names, max_input_side))
    }

    /// Wrap an already-loaded backend.
    pub fn new(scorer: Box<dyn RegionScorer>, class_names: Vec<String>, max_input_side: u32) -> Self {
        Self {
            scorer,
            class_names,
            max_input_side,
        }
    }
}

impl Detect for NeuralDetector {
    fn detect(&self, frame: &RgbImage, opts: DetectOptions) -> Result<Vec<RawDetection>, CvError> {
        let resized = scaled_to_fit(frame, self.max_input_side);
        let frame = resized.as_ref().unwrap_or(frame);

        let proposals = self.scorer.score_regions(frame)?;

        let mut boxes = Vec::new();
        let mut confidences = Vec::new();
        let mut class_ids = Vec::new();
        for proposal in proposals {
            let Some((class_id, score)) = best_class(&proposal.scores) else {
                continue;
            };
            if score > opts.confidence_threshold {
                boxes.push(proposal.bbox);
                confidences.push(score);
                class_ids.push(class_id);
            }
        }

        let survivors = nms::suppress(
            &boxes,
            &confidences,
            opts.confidence_threshold,
            opts.nms_threshold,
        );

        let mut detections = Vec::new();
        for index in survivors {
            let Some(label) = self.class_names.get(class_ids[index]) else {
                // Backend emitted a score vector longer than its vocabulary.
                continue;
            };
            if !filter::is_food_relevant(label) {
                continue;
            }
            detections.push(RawDetection {
                label: label.clone(),
                confidence: confidences[index],
                count: 1,
                bbox: boxes[index],
                category: categories::category_or_other(label).to_string(),
            });
        }

        Ok(detections)
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::Neural
    }

    fn class_count(&self) -> usize {
        self.class_names.len()
    }
}

/// Arg-max over a region's score vector.
fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn read_class_names(path: &Path) -> Result<Vec<String>, CvError> {
    let file = File::open(path).map_err(|source| CvError::ClassNames {
        path: path.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| CvError::ClassNames {
            path: path.to_path_buf(),
            source,
        })?;
        let name = line.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(CvError::EmptyClassNames(path.to_path_buf()));
    }
    Ok(names)
}
