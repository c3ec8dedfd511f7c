//! # REST API Module
//!
//! Maps HTTP verbs, path segments, query parameters and JSON bodies onto a
//! [`DocumentStore`](crate::store::DocumentStore), and store outcomes back
//! onto status codes and payloads.

pub mod errors;
pub mod handler;
pub mod index;
pub mod response;
pub mod server;

pub use errors::{RestError, RestResult};
pub use handler::{Operation, RestService};
pub use index::{Extractor, IndexEntry, IndexRegistry, IndexRequest, KeyParser};
pub use response::BulkResponse;
pub use server::RestServer;
