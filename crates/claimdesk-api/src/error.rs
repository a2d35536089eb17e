//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from claimdesk-core and storage errors from sqlx
//! to HTTP status codes. Every error response body is `{"error": "<message>"}`.
//! Internal error details are logged but never serialized to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON error response body.
///
/// Every error response on the API surface uses this shape: a single
/// human-readable `error` string. Stack traces and internal details are
/// never serialized here.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource absent, or deliberately hidden from a non-owner (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing/malformed fields, bad dates, amount over limit, illegal
    /// status transition (400).
    #[error("{0}")]
    InvalidInput(String),

    /// Missing, invalid, or expired credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but wrong owner or insufficient role (403).
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate contact, duplicate claim, or re-deciding a decided
    /// record (409).
    #[error("{0}")]
    Conflict(String),

    /// Storage failure or unexpected condition (500). The message is
    /// logged but not returned to the client.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Field validation failures surface as 400s.
impl From<claimdesk_core::ValidationError> for AppError {
    fn from(err: claimdesk_core::ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Lifecycle violations: an out-of-table transition is a client input
/// error; re-deciding a decided record conflicts with current state.
impl From<claimdesk_core::LifecycleError> for AppError {
    fn from(err: claimdesk_core::LifecycleError) -> Self {
        match &err {
            claimdesk_core::LifecycleError::InvalidTransition { .. } => {
                Self::InvalidInput(err.to_string())
            }
            claimdesk_core::LifecycleError::AlreadyDecided { .. } => {
                Self::Conflict(err.to_string())
            }
        }
    }
}

/// Storage errors map to 500 unless they carry the PostgreSQL
/// unique-violation code, which surfaces as 409.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::Conflict("already exists".to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}
