//! Middleware for admin authentication, CORS and request logging

pub mod auth;
pub mod cors;
pub mod logging;

use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

/// Standard error response for middleware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareError {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Request ID for tracing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl MiddlewareError {
    /// Create a new middleware error
    #[must_use]
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
            request_id: None,
        }
    }

    /// Attach the request id of the rejected request
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Convert middleware error to HTTP response
impl From<MiddlewareError> for (StatusCode, Json<MiddlewareError>) {
    fn from(error: MiddlewareError) -> Self {
        let status = match error.code.as_str() {
            "MISSING_TOKEN" | "INVALID_TOKEN" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" | "ORIGIN_NOT_ALLOWED" => StatusCode::FORBIDDEN,
            "INVALID_REQUEST" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error))
    }
}
