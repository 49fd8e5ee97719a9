//! Inventory state machine
//!
//! [`Inventory`] owns the three pieces of shared state: the item map, the
//! per-label cooldown table, and the append-only detection history. All
//! mutation goes through its methods; callers needing concurrent access
//! wrap it in their own lock.

use crate::categories;
use crate::error::Error;
use crate::types::{HistoryEntry, InventorySnapshot, ItemEntry, ManualItem, RawDetection};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Confidence recorded for manual items that do not supply one.
const DEFAULT_MANUAL_CONFIDENCE: f32 = 0.5;

/// Deduplicating store for detected and manually-entered food items.
///
/// Repeat detections of a label within its cooldown window are ignored
/// wholesale, so rescanning a static scene does not double-count. Items
/// reaching a count of zero are deleted, never retained.
#[derive(Debug)]
pub struct Inventory {
    items: HashMap<String, ItemEntry>,
    cooldowns: HashMap<String, Instant>,
    history: Vec<HistoryEntry>,
    cooldown_duration: Duration,
}

struct LabelGroup {
    count: u32,
    confidence_sum: f32,
    samples: u32,
}

impl Inventory {
    /// Create an empty inventory with the given cooldown window.
    pub fn new(cooldown_duration: Duration) -> Self {
        Self {
            items: HashMap::new(),
            cooldowns: HashMap::new(),
            history: Vec::new(),
            cooldown_duration,
        }
    }

    /// The configured cooldown window.
    pub fn cooldown_duration(&self) -> Duration {
        self.cooldown_duration
    }

    /// Merge one scan's detections into the inventory.
    ///
    /// Returns the number of units actually added (cooldown-skipped labels
    /// contribute nothing).
    pub fn reconcile_batch(&mut self, detections: &[RawDetection]) -> u32 {
        self.reconcile_batch_at(detections, Instant::now())
    }

    /// [`reconcile_batch`](Self::reconcile_batch) with an explicit clock,
    /// so callers (and tests) control the cooldown timeline.
    pub fn reconcile_batch_at(&mut self, detections: &[RawDetection], now: Instant) -> u32 {
        // Merge within the batch first: detections of one label in the
        // same frame are a single confidence-weighted group. The cooldown
        // gate then applies per group, so a frame is never partially
        // accepted for a label.
        let mut groups: HashMap<&str, LabelGroup> = HashMap::new();
        for detection in detections {
            let group = groups.entry(detection.label.as_str()).or_insert(LabelGroup {
                count: 0,
                confidence_sum: 0.0,
                samples: 0,
            });
            group.count += detection.count;
            group.confidence_sum += detection.confidence;
            group.samples += 1;
        }

        let mut accepted = 0;
        for (label, group) in groups {
            if group.count == 0 || self.on_cooldown(label, now) {
                continue;
            }
            let confidence = group.confidence_sum / group.samples as f32;
            self.accept(
                label,
                group.count,
                categories::category_or_other(label),
                confidence,
                now,
            );
            accepted += group.count;
        }
        accepted
    }

    /// Apply manual corrections, using the caller's category and
    /// confidence directly.
    ///
    /// Validation is all-or-nothing: any invalid item rejects the whole
    /// call before anything is mutated. Valid items still pass through the
    /// cooldown gate, so manual entry cannot bypass deduplication.
    pub fn save_items(&mut self, items: &[ManualItem]) -> Result<u32, Error> {
        self.save_items_at(items, Instant::now())
    }

    /// [`save_items`](Self::save_items) with an explicit clock.
    pub fn save_items_at(&mut self, items: &[ManualItem], now: Instant) -> Result<u32, Error> {
        for (index, item) in items.iter().enumerate() {
            if item.label.trim().is_empty() || item.category.trim().is_empty() || item.count == 0 {
                return Err(Error::InvalidItem { index });
            }
        }

        let mut accepted = 0;
        for item in items {
            if self.on_cooldown(&item.label, now) {
                continue;
            }
            let confidence = item.confidence.unwrap_or(DEFAULT_MANUAL_CONFIDENCE);
            self.accept(&item.label, item.count, &item.category, confidence, now);
            accepted += item.count;
        }
        Ok(accepted)
    }

    /// Remove `count` units of a label.
    ///
    /// Succeeds only when the entry exists with at least that many units;
    /// the entry is deleted outright when it reaches zero. The cooldown
    /// table is not consulted or updated.
    pub fn remove_item(&mut self, label: &str, count: u32) -> bool {
        match self.items.get_mut(label) {
            Some(entry) if entry.count >= count => {
                entry.count -= count;
                if entry.count == 0 {
                    self.items.remove(label);
                }
                true
            }
            _ => false,
        }
    }

    /// Drop all items, cooldowns and history.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cooldowns.clear();
        self.history.clear();
    }

    /// Current inventory with rollup totals. Never contains a zero-count
    /// entry.
    pub fn snapshot(&self) -> InventorySnapshot {
        let mut items = BTreeMap::new();
        let mut categories = BTreeMap::new();
        let mut total_items = 0;

        for (label, entry) in &self.items {
            if entry.count == 0 {
                continue;
            }
            total_items += entry.count;
            *categories.entry(entry.category.clone()).or_insert(0) += entry.count;
            items.insert(label.clone(), entry.clone());
        }

        InventorySnapshot {
            unique_items: items.len(),
            total_items,
            items,
            categories,
        }
    }

    /// Every accepted update, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn on_cooldown(&self, label: &str, now: Instant) -> bool {
        self.cooldowns
            .get(label)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.cooldown_duration)
    }

    /// The single accept path shared by detection and manual updates.
    fn accept(&mut self, label: &str, count: u32, category: &str, confidence: f32, now: Instant) {
        let timestamp = Utc::now().to_rfc3339();

        let entry = self
            .items
            .entry(label.to_string())
            .or_insert_with(|| ItemEntry {
                count: 0,
                category: String::new(),
                last_detected: None,
                confidence: 0.0,
            });
        entry.count += count;
        entry.category = category.to_string();
        entry.confidence = confidence;
        entry.last_detected = Some(timestamp.clone());

        self.cooldowns.insert(label.to_string(), now);
        self.history.push(HistoryEntry {
            label: label.to_string(),
            count,
            confidence,
            timestamp,
        });
    }
}
