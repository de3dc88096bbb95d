//! Error types for the storage layer and the mapping service
//!
//! `StoreError` is what a [`Repository`](crate::database::Repository) can fail with.
//! `AppError` is the set of outcomes the HTTP surface translates into status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<redb::Error> for StoreError {
    fn from(value: redb::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Backend(format!("corrupt record: {value}"))
    }
}

/// Error kinds surfaced by the mapping service
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed URL, id, date or request body
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
    /// API key not in the allow-list
    #[error("invalid API key")]
    Unauthorized,
    #[error("URL not found")]
    NotFound,
    /// Mapping exists but its expiry has passed
    #[error("URL has expired")]
    Gone,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Gone => StatusCode::GONE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidInput { field, message } => json!({
                "error": "invalid_input",
                "field": field,
                "message": message,
            }),
            Self::Unauthorized => json!({
                "error": "forbidden",
                "message": self.to_string(),
            }),
            Self::NotFound => json!({
                "error": "not_found",
                "message": self.to_string(),
            }),
            Self::Gone => json!({
                "error": "gone",
                "message": self.to_string(),
            }),
            Self::Storage(err) => {
                // Details stay in the log, never in the response
                tracing::error!(error = %err, "storage failure while handling request");
                json!({
                    "error": "internal_error",
                    "message": "Internal server error",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
