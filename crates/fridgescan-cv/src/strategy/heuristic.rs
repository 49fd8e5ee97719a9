//! Color-segmentation fallback strategy
//!
//! Used when no neural backend is available. Each known label has a
//! characteristic HSV range; the frame is thresholded into a binary mask
//! per range, cleaned with morphological closing and opening, and every
//! sufficiently large connected component becomes one detection with an
//! area-derived confidence. The per-label masks are independent, so no
//! cross-label suppression is needed.

use crate::strategy::{scaled_to_fit, Detect, DetectOptions, DetectionMethod};
use crate::CvError;
use fridgescan_core::{categories, BoundingBox, RawDetection};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use imageproc::region_labelling::{connected_components, Connectivity};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashMap;

/// Inclusive HSV bounds, OpenCV-scaled: H in [0, 180], S and V in [0, 255].
#[derive(Debug, Clone, Copy)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

/// Labels with a usable color signature inside a fridge.
const COLOR_RANGES: &[(&str, HsvRange)] = &[
    ("apple", HsvRange { lower: [0, 50, 50], upper: [10, 255, 255] }),
    ("banana", HsvRange { lower: [20, 100, 100], upper: [30, 255, 255] }),
    ("orange", HsvRange { lower: [10, 100, 100], upper: [20, 255, 255] }),
    ("carrot", HsvRange { lower: [10, 100, 100], upper: [20, 255, 255] }),
    ("broccoli", HsvRange { lower: [40, 50, 50], upper: [80, 255, 255] }),
    ("bottle", HsvRange { lower: [100, 50, 50], upper: [130, 255, 255] }),
    ("tomato", HsvRange { lower: [0, 100, 100], upper: [10, 255, 255] }),
    ("lemon", HsvRange { lower: [25, 100, 100], upper: [35, 255, 255] }),
    ("milk", HsvRange { lower: [0, 0, 200], upper: [180, 30, 255] }),
    ("cheese", HsvRange { lower: [20, 100, 100], upper: [30, 255, 255] }),
];

/// Components at or below this area are noise.
const MIN_COMPONENT_AREA: u32 = 300;
/// Area at which the base confidence saturates.
const AREA_PER_FULL_CONFIDENCE: f32 = 3000.0;
const BASE_CONFIDENCE_CAP: f32 = 0.9;
/// Boost applied to boxes with a compact aspect ratio.
const COMPACT_BOOST: f32 = 1.1;
const BOOSTED_CONFIDENCE_CAP: f32 = 0.95;
const MIN_COMPACT_ASPECT: f32 = 0.3;
const MAX_COMPACT_ASPECT: f32 = 3.0;
/// LInf radius 2 is a 5x5 square structuring element.
const MORPHOLOGY_RADIUS: u8 = 2;

/// Fallback strategy segmenting the frame by known color ranges.
pub struct ColorRangeDetector {
    max_input_side: u32,
}

impl ColorRangeDetector {
    pub fn new(max_input_side: u32) -> Self {
        Self { max_input_side }
    }
}

impl Detect for ColorRangeDetector {
    /// Confidence thresholds are ignored here: the area filter plays
    /// that role.
    fn detect(&self, frame: &RgbImage, _opts: DetectOptions) -> Result<Vec<RawDetection>, CvError> {
        let resized = scaled_to_fit(frame, self.max_input_side);
        let frame = resized.as_ref().unwrap_or(frame);

        let hsv = to_hsv(frame);

        #[cfg(feature = "parallel")]
        let ranges = COLOR_RANGES.par_iter();
        #[cfg(not(feature = "parallel"))]
        let ranges = COLOR_RANGES.iter();

        let detections: Vec<RawDetection> = ranges
            .flat_map(|(label, range)| scan_range(&hsv, label, range))
            .collect();
        Ok(detections)
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::ColorSegmentation
    }

    fn class_count(&self) -> usize {
        COLOR_RANGES.len()
    }
}

struct Extent {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

/// Segment one label's color range and convert its components into
/// detections.
fn scan_range(hsv: &RgbImage, label: &str, range: &HsvRange) -> Vec<RawDetection> {
    let (width, height) = hsv.dimensions();

    let mut mask = GrayImage::new(width, height);
    for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
        *dst = if in_range(src.0, range) {
            Luma([255])
        } else {
            Luma([0])
        };
    }

    // Close fills small gaps, open drops speckle noise.
    let mask = open(
        &close(&mask, Norm::LInf, MORPHOLOGY_RADIUS),
        Norm::LInf,
        MORPHOLOGY_RADIUS,
    );

    let labelled = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

    let mut components: HashMap<u32, Extent> = HashMap::new();
    for (x, y, pixel) in labelled.enumerate_pixels() {
        let component = pixel[0];
        if component == 0 {
            continue;
        }
        components
            .entry(component)
            .and_modify(|extent| {
                extent.min_x = extent.min_x.min(x);
                extent.min_y = extent.min_y.min(y);
                extent.max_x = extent.max_x.max(x);
                extent.max_y = extent.max_y.max(y);
                extent.area += 1;
            })
            .or_insert(Extent {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                area: 1,
            });
    }

    let mut detections = Vec::new();
    for extent in components.into_values() {
        if extent.area <= MIN_COMPONENT_AREA {
            continue;
        }

        let box_width = (extent.max_x - extent.min_x + 1) as f32;
        let box_height = (extent.max_y - extent.min_y + 1) as f32;

        let mut confidence =
            (extent.area as f32 / AREA_PER_FULL_CONFIDENCE).min(BASE_CONFIDENCE_CAP);
        let aspect = box_width / box_height;
        if (MIN_COMPACT_ASPECT..=MAX_COMPACT_ASPECT).contains(&aspect) {
            confidence = (confidence * COMPACT_BOOST).min(BOOSTED_CONFIDENCE_CAP);
        }

        detections.push(RawDetection {
            label: label.to_string(),
            confidence,
            count: 1,
            bbox: BoundingBox::new(extent.min_x as f32, extent.min_y as f32, box_width, box_height),
            category: categories::category_or_other(label).to_string(),
        });
    }
    detections
}

/// Per-pixel HSV planes stored in an RGB buffer (channels are H, S, V).
fn to_hsv(frame: &RgbImage) -> RgbImage {
    let mut hsv = RgbImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv(src.0));
    }
    hsv
}

/// OpenCV-scaled HSV: hue halved into [0, 180], saturation and value in
/// [0, 255].
fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    [
        (hue_degrees / 2.0).round() as u8,
        (saturation * 255.0).round() as u8,
        (max * 255.0).round() as u8,
    ]
}

fn in_range(pixel: [u8; 3], range: &HsvRange) -> bool {
    (0..3).all(|i| range.lower[i] <= pixel[i] && pixel[i] <= range.upper[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> DetectOptions {
        DetectOptions {
            confidence_threshold: 0.3,
            nms_threshold: 0.4,
        }
    }

    fn frame_with_block(color: Rgb<u8>, x0: u32, y0: u32, w: u32, h: u32) -> RgbImage {
        let mut frame = RgbImage::new(200, 200);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                frame.put_pixel(x, y, color);
            }
        }
        frame
    }

    #[test]
    fn hsv_conversion_matches_known_hues() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn blue_block_reads_as_a_bottle() {
        let frame = frame_with_block(Rgb([0, 0, 255]), 60, 60, 80, 80);
        let detector = ColorRangeDetector::new(1024);

        let detections = detector.detect(&frame, options()).unwrap();

        assert_eq!(detections.len(), 1);
        let bottle = &detections[0];
        assert_eq!(bottle.label, "bottle");
        assert_eq!(bottle.category, "Beverages");
        assert_eq!(bottle.count, 1);
        // 6400 px saturates the base cap, and a square box earns the
        // compact-aspect boost.
        assert!((bottle.confidence - 0.95).abs() < 1e-6);
        assert_eq!(bottle.bbox.x, 60.0);
        assert_eq!(bottle.bbox.y, 60.0);
        assert_eq!(bottle.bbox.width, 80.0);
        assert_eq!(bottle.bbox.height, 80.0);
    }

    #[test]
    fn elongated_regions_skip_the_compact_boost() {
        // 90x20: area 1800, aspect 4.5.
        let frame = frame_with_block(Rgb([0, 0, 255]), 20, 100, 90, 20);
        let detector = ColorRangeDetector::new(1024);

        let detections = detector.detect(&frame, options()).unwrap();

        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 1800.0 / 3000.0).abs() < 1e-6);
    }

    #[test]
    fn small_blobs_are_ignored() {
        let frame = frame_with_block(Rgb([0, 0, 255]), 10, 10, 10, 10);
        let detector = ColorRangeDetector::new(1024);

        assert!(detector.detect(&frame, options()).unwrap().is_empty());
    }

    #[test]
    fn empty_frame_yields_nothing() {
        let detector = ColorRangeDetector::new(1024);
        let detections = detector.detect(&RgbImage::new(200, 200), options()).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn white_block_reads_as_milk() {
        let frame = frame_with_block(Rgb([255, 255, 255]), 40, 40, 60, 60);
        let detector = ColorRangeDetector::new(1024);

        let detections = detector.detect(&frame, options()).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "milk");
    }

    #[test]
    fn saturated_red_matches_both_red_ranges() {
        // Apple and tomato share the red hue band; both ranges fire and
        // the reconciliation layer sorts out what to keep.
        let frame = frame_with_block(Rgb([255, 0, 0]), 60, 60, 80, 80);
        let detector = ColorRangeDetector::new(1024);

        let mut labels: Vec<String> = detector
            .detect(&frame, options())
            .unwrap()
            .into_iter()
            .map(|d| d.label)
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["apple", "tomato"]);
    }
}
