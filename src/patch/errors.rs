//! # Patch Errors

use thiserror::Error;

/// Result type for patch decoding and application
pub type PatchResult<T> = Result<T, PatchError>;

/// Patch errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    /// Body is not a valid patch encoding
    #[error("Invalid patch encoding: {0}")]
    Decode(String),

    /// Bulk patches must address a keyed collection
    #[error("Bulk patch must be a Map operation, got {0}")]
    NotAMap(&'static str),

    /// Ins applied where a value already exists
    #[error("Cannot insert over an existing value")]
    AlreadyPresent,

    /// Del or Mrg applied where no value exists
    #[error("Cannot apply {0} to a missing value")]
    Missing(&'static str),

    /// Mrg applied to something other than an object
    #[error("Cannot merge into a non-object value")]
    NotAnObject,

    /// Map applied through the value path rather than a collection
    #[error("Map operations apply to collections, not single values")]
    NestedMap,
}
