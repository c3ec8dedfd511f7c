//! Observability for the REST layer
//!
//! - Structured JSON logging with a configurable floor
//! - Per-operation request and failure counters
//!
//! Observability is read-only: nothing here changes request outcomes.

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
