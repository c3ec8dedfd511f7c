//! docrest - REST access to a keyed document store
//!
//! Translates HTTP verbs, path segments, query parameters and JSON bodies
//! into store operations, and store outcomes back into status codes and
//! JSON payloads. Storage and patch application belong to the store.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod patch;
pub mod rest_api;
pub mod store;
