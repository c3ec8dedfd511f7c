//! CLI-specific error types
//!
//! Every variant ends the process with a non-zero exit code. The display
//! form leads with a stable `DOCREST_*` code for scripts.

use std::io;

use thiserror::Error;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Failures surfaced by `docrest serve` and `docrest check`
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("DOCREST_CONFIG_ERROR: {0}")]
    Config(String),

    /// Writing command output failed
    #[error("DOCREST_IO_ERROR: {0}")]
    Io(#[from] io::Error),

    /// Command output could not be encoded
    #[error("DOCREST_IO_ERROR: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server failed to start or stopped abnormally
    #[error("DOCREST_SERVE_FAILED: {0}")]
    ServeFailed(String),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        CliError::ServeFailed(msg.into())
    }

    /// Stable code for log lines and scripts
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "DOCREST_CONFIG_ERROR",
            CliError::Io(_) | CliError::Json(_) => "DOCREST_IO_ERROR",
            CliError::ServeFailed(_) => "DOCREST_SERVE_FAILED",
        }
    }

    /// Display text without the code prefix
    pub fn message(&self) -> String {
        match self {
            CliError::Config(msg) | CliError::ServeFailed(msg) => msg.clone(),
            CliError::Io(e) => e.to_string(),
            CliError::Json(e) => format!("JSON error: {}", e),
        }
    }
}
