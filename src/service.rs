//! Async facade over detection and reconciliation

use crate::config::ScannerConfig;
use crate::error::ServiceError;
use chrono::Utc;
use fridgescan_core::{
    categories, HistoryEntry, Inventory, InventorySnapshot, ManualItem, RawDetection,
};
use fridgescan_cv::{select_strategy, Detect, DetectOptions, DetectionMethod, ScorerLoader};
use image::RgbImage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tracing::info;

/// Lowest accepted runtime confidence threshold.
const MIN_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Everything the strategy saw, including detections the cooldown
    /// later skipped.
    pub detections: Vec<RawDetection>,
    /// Units actually added to the inventory.
    pub total_new_items: u32,
    pub message: String,
}

/// Effective runtime configuration, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub detection_method: &'static str,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    pub cooldown_duration_secs: f32,
    pub category_count: usize,
    /// Labels the active strategy can emit.
    pub class_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub total_items: u32,
    pub detection_method: &'static str,
    pub confidence_threshold: f32,
    pub category_count: usize,
}

/// Process-wide scanner: one cached detection strategy plus the shared
/// inventory state.
///
/// All inventory mutation runs under the write half of a single lock, so
/// a concurrent snapshot never observes a half-applied update and two
/// concurrent scans of the same label cannot both pass the cooldown
/// check. Detection is CPU-bound and runs on blocking worker threads,
/// bounded by a semaphore so a burst of scans cannot starve the runtime.
pub struct FridgeService {
    inventory: RwLock<Inventory>,
    strategy: Arc<dyn Detect>,
    options: RwLock<DetectOptions>,
    detect_slots: Arc<Semaphore>,
    detect_timeout: Duration,
    cooldown_duration: Duration,
}

impl FridgeService {
    /// Select a strategy (neural when `loader` can produce a scoring
    /// backend, color segmentation otherwise) and start with an empty
    /// inventory. The selection is cached for the service's lifetime.
    pub fn new(config: &ScannerConfig, loader: Option<&dyn ScorerLoader>) -> Self {
        let strategy = select_strategy(&config.detection, loader);
        Self::with_strategy(config, strategy)
    }

    /// Build around an explicit strategy. Useful for embedders and tests.
    pub fn with_strategy(config: &ScannerConfig, strategy: Box<dyn Detect>) -> Self {
        info!(method = strategy.method().as_str(), "scanner ready");
        Self {
            inventory: RwLock::new(Inventory::new(config.cooldown_duration)),
            strategy: Arc::from(strategy),
            options: RwLock::new(DetectOptions::from(&config.detection)),
            detect_slots: Arc::new(Semaphore::new(config.max_concurrent_detections)),
            detect_timeout: config.detect_timeout,
            cooldown_duration: config.cooldown_duration,
        }
    }

    /// Decode a frame, run the cached strategy off the async runtime,
    /// and reconcile the result into the inventory.
    pub async fn scan(&self, image_bytes: &[u8]) -> Result<ScanOutcome, ServiceError> {
        let frame = image::load_from_memory(image_bytes)
            .map_err(ServiceError::InvalidImage)?
            .to_rgb8();

        let detections = self.detect(frame).await?;
        let total_new_items = self.inventory.write().await.reconcile_batch(&detections);

        info!(
            detections = detections.len(),
            added = total_new_items,
            "scan reconciled"
        );
        Ok(ScanOutcome {
            message: format!(
                "Processed image. Detected {} item(s), added {} new item(s).",
                detections.len(),
                total_new_items
            ),
            detections,
            total_new_items,
        })
    }

    async fn detect(&self, frame: RgbImage) -> Result<Vec<RawDetection>, ServiceError> {
        let opts = *self.options.read().await;
        let _permit = Arc::clone(&self.detect_slots)
            .acquire_owned()
            .await
            .map_err(|_| ServiceError::PoolClosed)?;

        let strategy = Arc::clone(&self.strategy);
        let task = tokio::task::spawn_blocking(move || strategy.detect(&frame, opts));

        match tokio::time::timeout(self.detect_timeout, task).await {
            // Blocking work cannot be aborted; dropping the handle
            // detaches it and this scan reports failure.
            Err(_) => Err(ServiceError::DetectionTimeout),
            Ok(joined) => joined?.map_err(ServiceError::Detection),
        }
    }

    /// Current inventory with rollup totals.
    pub async fn inventory(&self) -> InventorySnapshot {
        self.inventory.read().await.snapshot()
    }

    /// Apply manual corrections; the cooldown gate still applies per
    /// label.
    pub async fn save_items(&self, items: &[ManualItem]) -> Result<u32, ServiceError> {
        let added = self.inventory.write().await.save_items(items)?;
        info!(added, "manual inventory save");
        Ok(added)
    }

    /// Remove units of one label. `false` means the label was absent or
    /// held fewer units than requested.
    pub async fn remove_item(&self, label: &str, count: u32) -> bool {
        self.inventory.write().await.remove_item(label, count)
    }

    /// Drop all items, cooldowns and history.
    pub async fn clear(&self) {
        self.inventory.write().await.clear();
        info!("inventory cleared");
    }

    /// Every accepted update, oldest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inventory.read().await.history().to_vec()
    }

    /// The static label -> category table.
    pub fn categories(&self) -> BTreeMap<&'static str, &'static str> {
        categories::table().iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Update the confidence threshold used by subsequent scans.
    pub async fn set_confidence_threshold(&self, value: f32) -> Result<(), ServiceError> {
        if !(MIN_CONFIDENCE_THRESHOLD..=1.0).contains(&value) {
            return Err(ServiceError::ThresholdOutOfRange {
                value,
                min: MIN_CONFIDENCE_THRESHOLD,
            });
        }
        self.options.write().await.confidence_threshold = value;
        info!(value, "confidence threshold updated");
        Ok(())
    }

    pub async fn config(&self) -> ConfigReport {
        let opts = *self.options.read().await;
        ConfigReport {
            detection_method: self.strategy.method().as_str(),
            confidence_threshold: opts.confidence_threshold,
            nms_threshold: opts.nms_threshold,
            cooldown_duration_secs: self.cooldown_duration.as_secs_f32(),
            category_count: categories::label_count(),
            class_count: self.strategy.class_count(),
        }
    }

    pub async fn health(&self) -> HealthReport {
        let snapshot = self.inventory.read().await.snapshot();
        let opts = *self.options.read().await;
        HealthReport {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339(),
            total_items: snapshot.total_items,
            detection_method: self.strategy.method().as_str(),
            confidence_threshold: opts.confidence_threshold,
            category_count: categories::label_count(),
        }
    }

    /// Which strategy this process selected at startup.
    pub fn detection_method(&self) -> DetectionMethod {
        self.strategy.method()
    }
}
