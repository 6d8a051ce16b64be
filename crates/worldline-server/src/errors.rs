//! API error type and its JSON wire envelope.
//!
//! Every error response carries the same shape:
//!
//! ```json
//! {"error": {"code": "NOT_FOUND", "message": "...", "field": "..."}}
//! ```
//!
//! `field` appears only on validation errors that point at a specific
//! payload field. Internal errors are logged with full detail but reach
//! the client as an opaque message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use worldline_store::StoreError;

/// An error surfaced to an API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or unrecognized credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The addressed resource does not exist for this caller.
    ///
    /// Also covers resources owned by other users; their existence is
    /// never disclosed.
    #[error("{0}")]
    NotFound(String),

    /// The request payload failed validation.
    #[error("{message}")]
    Validation {
        /// Dotted path to the offending field, when known.
        field: Option<String>,
        /// Human-readable description.
        message: String,
    },

    /// Unexpected store failure; detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(StoreError),
}

impl ApiError {
    /// Stable machine-readable code for the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::NotFound(format!("event not found: {id}")),
            StoreError::Validation { field, message } => Self::Validation {
                field: Some(field),
                message,
            },
            other => Self::Internal(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, field) = match self {
            Self::Internal(err) => {
                error!(%err, "request failed with internal error");
                ("internal server error".to_owned(), None)
            }
            Self::Validation { field, message } => (message, field),
            Self::Unauthorized(message) | Self::NotFound(message) => (message, None),
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}
