//! # Response Formatting

use serde::Serialize;

/// Bulk patch result: how many records the patch touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkResponse {
    pub count: usize,
}

impl BulkResponse {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}
