//! Bearer token authentication for admin routes

use crate::{
    auth::{Claims, token_from_header},
    middleware::{MiddlewareError, logging::RequestId},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reject requests without a valid admin token
///
/// Verified claims are stored in the request extensions.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, axum::Json<MiddlewareError>)> {
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());

    let claims = match authenticate(&state, &headers) {
        Ok(claims) => claims,
        Err(e) => return Err(e.with_request_id(request_id).into()),
    };

    debug!(user_id = claims.user_id, "Admin request authenticated");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, MiddlewareError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_header)
        .ok_or_else(|| MiddlewareError::new("Missing token", "MISSING_TOKEN"))?;

    state.jwt.verify(token).map_err(|e| {
        warn!("Rejected admin token: {}", e);
        MiddlewareError::new("Invalid token", "INVALID_TOKEN")
    })
}
