//! CLI module for docrest
//!
//! Provides command-line interface for:
//! - serve: Serve an in-memory document store over HTTP
//! - check: Validate a configuration file

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve};
pub use config::{Config, IndexConfig, KeyType};
pub use errors::{CliError, CliResult};
