//! Application error type shared by every layer.
//!
//! [`AppError`] is returned by repositories and services and converted into a
//! JSON HTTP response by its [`IntoResponse`] implementation.
//!
//! # Response body
//!
//! ```json
//! {
//!   "error": {
//!     "code": "not_found",
//!     "message": "Short URL not found",
//!     "details": { "short_code": "Ab3xY9" }
//!   }
//! }
//! ```
//!
//! Server-side failures (5xx) are logged with their details and answered with
//! a generic message so that storage internals never reach the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::url_validator::UrlValidationError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad user input (400).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Unknown short code (404).
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Uniqueness conflict reported by the store.
    #[error("{message}")]
    DuplicateKey { message: String, details: Value },

    /// Every generation attempt collided with an existing code.
    #[error("{message}")]
    CodeSpaceExhausted { message: String, details: Value },

    /// Transport, pool or timeout failure talking to the store.
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn duplicate_key(message: impl Into<String>, details: Value) -> Self {
        Self::DuplicateKey {
            message: message.into(),
            details,
        }
    }

    pub fn code_space_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::CodeSpaceExhausted {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for failures worth retrying against the store.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateKey { .. }
            | Self::CodeSpaceExhausted { .. }
            | Self::StoreUnavailable { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the client-facing payload.
    ///
    /// Client errors keep their message and details; server errors are reduced
    /// to a generic message with empty details.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            Self::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            Self::CodeSpaceExhausted { .. } => ErrorInfo {
                code: "code_space_exhausted",
                message: "Could not allocate a short code, please retry".to_string(),
                details: json!({}),
            },
            Self::StoreUnavailable { .. } => ErrorInfo {
                code: "store_unavailable",
                message: "Storage is temporarily unavailable".to_string(),
                details: json!({}),
            },
            Self::DuplicateKey { .. } | Self::Internal { .. } => ErrorInfo {
                code: "internal_error",
                message: "Internal server error".to_string(),
                details: json!({}),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, details = ?details_of(&self), "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

fn details_of(err: &AppError) -> &Value {
    match err {
        AppError::Validation { details, .. }
        | AppError::NotFound { details, .. }
        | AppError::DuplicateKey { details, .. }
        | AppError::CodeSpaceExhausted { details, .. }
        | AppError::StoreUnavailable { details, .. }
        | AppError::Internal { details, .. } => details,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::duplicate_key(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => {
                AppError::store_unavailable("Database unavailable", json!({ "reason": e.to_string() }))
            }
            other => AppError::internal("Database error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::bad_request(e.to_string(), json!({ "field": "url", "reason": e.kind() }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("Invalid request body", json!({ "reason": rejection.body_text() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({})),
        )
    }
}
