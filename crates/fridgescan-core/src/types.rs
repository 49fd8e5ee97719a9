//! Shared detection and inventory types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned box in pixel coordinates of the scanned frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the box
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Intersection over union with another box.
    ///
    /// Disjoint and degenerate (zero-area) boxes score exactly 0.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }

        intersection / union
    }
}

/// One candidate food item observed in a single frame.
///
/// Strategies emit these with `count = 1`; the count field exists so that
/// manual entries and batch grouping share one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub confidence: f32,
    pub count: u32,
    pub bbox: BoundingBox,
    pub category: String,
}

/// Inventory state for one distinct label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub count: u32,
    pub category: String,
    /// RFC 3339 timestamp of the last accepted update, if any.
    pub last_detected: Option<String>,
    /// Rolling confidence: the average of the most recent accepted batch.
    pub confidence: f32,
}

/// Point-in-time view of the inventory with rollup totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub items: BTreeMap<String, ItemEntry>,
    pub total_items: u32,
    pub unique_items: usize,
    /// Category name mapped to the summed count of its entries.
    pub categories: BTreeMap<String, u32>,
}

/// One accepted label-group, as recorded in the detection history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub count: u32,
    pub confidence: f32,
    pub timestamp: String,
}

/// Caller-supplied inventory correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualItem {
    pub label: String,
    pub count: u32,
    pub category: String,
    /// Defaults to 0.5 when omitted.
    pub confidence: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!((b.iou(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(50.0, 50.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_zero_area_box_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(b.iou(&a), 0.0);
    }

    #[test]
    fn iou_of_partial_overlap() {
        // Two 10x10 boxes offset by 5 in both axes: 25 / 175.
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }
}
