//! Error types for cadencer
//!
//! `Error` is the service-layer taxonomy; `ApiError` is the HTTP-facing
//! wrapper with JSON bodies and status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service-layer error taxonomy
#[derive(Debug, Error)]
pub enum Error {
    /// A required resource key or property is not configured for a client.
    /// Callers skip the affected unit and continue.
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// A remote API call failed (network error or non-success status).
    /// Scoped to one sub-operation; callers degrade to a safe default.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Unexpected payload shape from a remote service
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error (registry file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// API error type returned from axum handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Service-layer error
    #[error(transparent)]
    Service(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Service(err) => match err {
                Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
                Error::ConfigMissing(msg) => (StatusCode::BAD_REQUEST, "CONFIG_MISSING", msg),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    other.to_string(),
                ),
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
