// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Validation with per-field detail (from `validator` derive checks).
    #[error("Invalid request")]
    ValidationFields(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        details.sort();
        AppError::ValidationFields(details)
    }
}

/// JSON error envelope body.
///
/// Mirrors the success envelope in `response.rs`: every failure carries the
/// numeric status, a message, `success: false` and an `errors` list.
#[derive(Serialize)]
struct ErrorEnvelope {
    status: u16,
    message: String,
    success: bool,
    errors: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), vec![]),
            AppError::ValidationFields(details) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                details.clone(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), vec![]),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
                vec![],
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), vec![]),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), vec![]),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                    vec![],
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                    vec![],
                )
            }
        };

        let body = ErrorEnvelope {
            status: status.as_u16(),
            message,
            success: false,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
