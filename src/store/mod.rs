//! # Document Store Interface
//!
//! The REST layer never implements storage. It talks to a store through
//! [`DocumentStore`], which owns lookup, predicate scans, writes, deletes
//! and patch application. [`MemoryStore`] is the in-process reference
//! implementation used by the server binary and the tests.

mod document;
mod errors;
mod memory;

use std::fmt::{Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::patch::Patch;

pub use document::{DocumentKey, JsonDocument, KEY_FIELD};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Index predicate: `(query value, record) -> matches`
pub type Predicate<R> = Arc<dyn Fn(&Value, &R) -> bool + Send + Sync>;

/// A record that carries its own unique key
pub trait Keyed {
    type Key;

    fn key(&self) -> Self::Key;
}

/// Keyed document store used by the REST layer
///
/// Every operation is atomic from the caller's point of view: it either
/// completes as a whole or fails without side effects.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Native key type
    type Key: Clone + PartialEq + Debug + Display + Send + Sync + 'static;

    /// Stored document type
    type Record: Serialize + Send + Sync + 'static;

    /// Build a record from a request body. `None` means the body is unusable.
    fn decode(&self, body: Value) -> Option<Self::Record>;

    /// Build a key from its JSON form, as found in collection patches
    fn decode_key(&self, raw: &Value) -> Option<Self::Key>;

    /// The key a record is stored under
    fn key_of(&self, record: &Self::Record) -> Self::Key;

    /// Look up a single record
    async fn find(&self, key: &Self::Key) -> StoreResult<Self::Record>;

    /// All records matching `predicate(value, record)`, in key order
    async fn find_all(
        &self,
        predicate: &Predicate<Self::Record>,
        value: &Value,
    ) -> StoreResult<Vec<Self::Record>>;

    /// Insert or replace a record under its own key
    async fn upsert(&self, record: Self::Record) -> StoreResult<()>;

    /// Remove a single record
    async fn remove(&self, key: &Self::Key) -> StoreResult<()>;

    /// Remove every matching record, returning how many were removed
    async fn remove_all(
        &self,
        predicate: &Predicate<Self::Record>,
        value: &Value,
    ) -> StoreResult<usize>;

    /// Apply a collection patch as a unit, returning how many records changed
    async fn apply_patch(&self, patch: &Patch) -> StoreResult<usize>;
}
