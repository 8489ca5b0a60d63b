//! Error types for sseudam-ar
//!
//! [`AnalysisError`] is the request-level taxonomy returned by the pipeline
//! and rendered as an HTTP response. Client-caused variants are detected
//! before any state changes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scoring::ScoringError;

/// Token verification failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthFailure {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a Bearer token")]
    MalformedHeader,

    #[error("token rejected: {0}")]
    InvalidToken(String),
}

/// Failure of one outbound delivery
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("delivery timed out after {0} ms")]
    Timeout(u64),
}

/// Pipeline error
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing, malformed or rejected credentials (401)
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// Token is valid but no ranking account exists (404)
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Request body is missing fields or has wrong types (400)
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Storage or other server-side failure (500)
    ///
    /// The detail is logged, never returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ScoringError> for AnalysisError {
    fn from(err: ScoringError) -> Self {
        AnalysisError::MalformedInput(err.to_string())
    }
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Auth(_) => StatusCode::UNAUTHORIZED,
            AnalysisError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AnalysisError::Auth(failure) => json!({
                "error": "Unauthorized",
                "details": failure.to_string(),
            }),
            AnalysisError::UserNotFound(_) => json!({
                "error": "User not found",
            }),
            AnalysisError::MalformedInput(details) => json!({
                "error": "Malformed input",
                "details": details,
            }),
            AnalysisError::Internal(_) => json!({
                "error": "Internal server error",
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for pipeline operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
