//! Request counters for the REST layer
//!
//! - Counters only, monotonic, reset on process start
//! - Relaxed atomics; exact totals, no cross-counter consistency

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::rest_api::{Operation, RestError};

/// Counters shared by every request task
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    find_one: AtomicU64,
    find_by_index: AtomicU64,
    upsert_one: AtomicU64,
    delete_one: AtomicU64,
    delete_by_index: AtomicU64,
    bulk_patch: AtomicU64,
    /// Records changed by successful bulk patches
    records_patched: AtomicU64,
    not_found: AtomicU64,
    /// Unknown index, bad identifier, bad payload
    rejected: AtomicU64,
    backend_failures: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub find_one: u64,
    pub find_by_index: u64,
    pub upsert_one: u64,
    pub delete_one: u64,
    pub delete_by_index: u64,
    pub bulk_patch: u64,
    pub records_patched: u64,
    pub not_found: u64,
    pub rejected: u64,
    pub backend_failures: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `op`
    pub fn record_request(&self, op: Operation) {
        let counter = match op {
            Operation::FindOne => &self.find_one,
            Operation::FindByIndex => &self.find_by_index,
            Operation::UpsertOne => &self.upsert_one,
            Operation::DeleteOne => &self.delete_one,
            Operation::DeleteByIndex => &self.delete_by_index,
            Operation::BulkPatch => &self.bulk_patch,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed request by kind
    pub fn record_failure(&self, err: &RestError) {
        let counter = match err {
            RestError::NotFound(_) => &self.not_found,
            RestError::UnknownIndex(_) | RestError::BadIdentifier(_) | RestError::BadPayload(_) => {
                &self.rejected
            }
            RestError::BackendFailure(_) => &self.backend_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_patched(&self, count: usize) {
        self.records_patched.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            find_one: self.find_one.load(Ordering::Relaxed),
            find_by_index: self.find_by_index.load(Ordering::Relaxed),
            upsert_one: self.upsert_one.load(Ordering::Relaxed),
            delete_one: self.delete_one.load(Ordering::Relaxed),
            delete_by_index: self.delete_by_index.load(Ordering::Relaxed),
            bulk_patch: self.bulk_patch.load(Ordering::Relaxed),
            records_patched: self.records_patched.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
        }
    }
}
