//! API error taxonomy
//!
//! `ApiError` is the single error type handlers return. Each variant maps to
//! one HTTP status; infrastructure failures (`sqlx`, hashing, token signing)
//! are logged server-side and surfaced as an opaque 500 so nothing internal
//! leaks to the client.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Username already taken (case-sensitive exact match)
    #[error("Username already exists")]
    DuplicateUsername,

    /// Unified failure for unknown username and wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or revoked bearer token
    #[error("Invalid or missing token")]
    Unauthenticated,

    /// Order absent, or owned by another user (indistinguishable on purpose)
    #[error("Resource not found")]
    NotFound,

    /// Malformed or rejected input
    #[error("{0}")]
    Validation(String),

    /// Infrastructure failure, details already logged
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateUsername | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database error");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
