//! Admin login and logout

use crate::handlers::{ApiResult, api_error};
use crate::state::AppState;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Login request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    /// The shared admin password
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    /// Bearer token for admin routes
    pub token: String,
}

/// Logout response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message
    pub message: String,
}

/// Exchange the admin password for a token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = body.map_err(|e| {
        warn!("Malformed login request: {}", e);
        api_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", "Invalid JSON")
    })?;

    let expected = &state.config.security.admin_password;
    if expected.is_empty() || !constant_time_eq(request.password.as_bytes(), expected.as_bytes())
    {
        warn!("Admin login failed");
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "INVALID_PASSWORD",
            "Invalid password",
        ));
    }

    let token = state.jwt.issue(chrono::Utc::now()).map_err(|e| {
        error!("Failed to issue admin token: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Failed to generate token",
        )
    })?;

    info!("Admin logged in");
    Ok(Json(LoginResponse { token }))
}

/// Acknowledge a logout; tokens are stateless and simply dropped by the client
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logout successful".to_string(),
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
