//! Typed errors for the reconciliation core

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A manual-save item failed validation. Nothing was mutated.
    #[error("item {index} must have a non-empty label, a non-empty category, and a count of at least 1")]
    InvalidItem { index: usize },
}
