//! # Patch Module
//!
//! Differential updates applied in bulk against a keyed collection.
//! The router only decodes patches; stores apply them.

mod errors;
mod ops;

pub use errors::{PatchError, PatchResult};
pub use ops::Patch;
