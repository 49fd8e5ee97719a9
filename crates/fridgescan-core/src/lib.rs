//! Inventory reconciliation core
//!
//! Fuses noisy, repeated per-frame food detections into a stable,
//! queryable inventory: batch merging, per-label cooldown windows,
//! confidence averaging and category rollups. Image handling and the
//! detection strategies live in `fridgescan-cv`; this crate only deals in
//! already-produced detections.

pub mod categories;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod types;

pub use error::Error;
pub use inventory::Inventory;
pub use types::{
    BoundingBox, HistoryEntry, InventorySnapshot, ItemEntry, ManualItem, RawDetection,
};
