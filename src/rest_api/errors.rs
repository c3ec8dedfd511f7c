//! # REST API Errors
//!
//! Failure taxonomy for the REST layer. Every failure becomes an HTTP
//! status plus a plain-text body carrying the error's description.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::store::StoreError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestError {
    /// `:index` names no registered index
    #[error("unknown index: {0}")]
    UnknownIndex(String),

    /// Key absent from the store
    #[error("{0} not found")]
    NotFound(String),

    /// `:uid` did not parse into a usable key
    #[error("Bad uid: {0}")]
    BadIdentifier(String),

    /// Body is not a usable record or patch
    #[error("Bad object data: {0}")]
    BadPayload(String),

    /// Any other store failure
    #[error("{0}")]
    BackendFailure(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::UnknownIndex(_) => StatusCode::NOT_FOUND,
            RestError::NotFound(_) => StatusCode::NOT_FOUND,

            RestError::BadIdentifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::BadPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::BackendFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short tag used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RestError::UnknownIndex(_) => "unknown_index",
            RestError::NotFound(_) => "not_found",
            RestError::BadIdentifier(_) => "bad_identifier",
            RestError::BadPayload(_) => "bad_payload",
            RestError::BackendFailure(_) => "backend_failure",
        }
    }

    /// Classify a store failure where a missing key is meaningful
    pub fn from_lookup(err: StoreError, uid: &str) -> Self {
        if err.is_not_found() {
            RestError::NotFound(uid.to_string())
        } else {
            RestError::BackendFailure(err.to_string())
        }
    }
}

impl From<StoreError> for RestError {
    /// Outside point lookups every store failure is a backend failure
    fn from(err: StoreError) -> Self {
        RestError::BackendFailure(err.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
