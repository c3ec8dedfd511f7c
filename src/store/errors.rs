//! # Store Errors

use thiserror::Error;

use crate::patch::PatchError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a document store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// No record exists under the key
    #[error("{0} not found")]
    NotFound(String),

    /// A patch could not be applied
    #[error("Patch failed: {0}")]
    Patch(#[from] PatchError),

    /// A stored or patched value does not fit the record type
    #[error("Record conversion failed: {0}")]
    Conversion(String),

    /// Any other backend failure
    #[error("Backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(key: impl std::fmt::Display) -> Self {
        StoreError::NotFound(key.to_string())
    }

    /// True when the failure means the key is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Conversion(e.to_string())
    }
}
