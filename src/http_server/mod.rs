//! # HTTP Server Module
//!
//! Serves a [`RestService`](crate::rest_api::RestService) over HTTP.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Request counters
//! - `<mount_path>/*` - REST routes for the document store

pub mod config;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
