//! HTTP request handlers

pub mod auth;
pub mod categories;
pub mod health;
pub mod menu;
pub mod news;

use axum::{http::StatusCode, response::Json};
use cafe_core::{Error, FieldErrors};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Machine-readable code
    pub code: String,
    /// Extra structured context, e.g. per-field messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Rejection type shared by the handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handler result alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Build a rejection
pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            details: None,
        }),
    )
}

/// 400 carrying one message per failing field
#[must_use]
pub fn validation_error(errors: &FieldErrors) -> ApiError {
    warn!("Rejected form: {}", errors);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Validation failed".to_string(),
            code: "VALIDATION_ERROR".to_string(),
            details: Some(json!({ "fields": errors })),
        }),
    )
}

/// Map a core error to its HTTP rejection
#[must_use]
pub fn from_core(err: Error) -> ApiError {
    match err {
        Error::Validation { field, message } => {
            let mut errors = FieldErrors::default();
            errors.insert(field, message);
            validation_error(&errors)
        }
        Error::NotFound { resource } => {
            api_error(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{resource} not found"))
        }
        Error::Conflict { message, details } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: message,
                code: "CATEGORY_IN_USE".to_string(),
                details: Some(json!({ "items": details })),
            }),
        ),
        Error::Authentication(message) => {
            api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
        }
        Error::Upload(message) => {
            warn!("Rejected upload: {}", message);
            api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_UPLOAD",
                format!("Failed to save images: {message}"),
            )
        }
        other => {
            error!("Request failed: {}", other);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            )
        }
    }
}
