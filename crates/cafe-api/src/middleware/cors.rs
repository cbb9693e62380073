//! CORS middleware for cross-origin request handling

use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Request-ID";

/// CORS middleware that handles cross-origin requests based on configuration
pub async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.api.enable_cors {
        return next.run(request).await;
    }

    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let allowed = &state.config.api.cors_origins;

    if let Some(origin) = origin.as_deref()
        && !is_origin_allowed(origin, allowed)
    {
        warn!("Origin {} not allowed by CORS policy", origin);
        return StatusCode::FORBIDDEN.into_response();
    }

    if request.method() == Method::OPTIONS {
        debug!("Handling CORS preflight request");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        add_cors_headers(&mut response, origin.as_deref(), allowed);
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
        return response;
    }

    let mut response = next.run(request).await;
    add_cors_headers(&mut response, origin.as_deref(), allowed);
    response
}

/// Check if the given origin is allowed by the CORS policy
pub fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|allowed| {
        if allowed == "*" || allowed == origin {
            return true;
        }
        // "*.example.com" matches subdomains only
        allowed
            .strip_prefix("*.")
            .is_some_and(|domain| origin.ends_with(&format!(".{domain}")))
    })
}

fn add_cors_headers(response: &mut Response, origin: Option<&str>, allowed: &[String]) {
    let headers = response.headers_mut();

    if allowed.iter().any(|o| o == "*") {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    } else if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }

    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("X-Request-ID"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_origin_allowed_wildcard() {
        let origins = vec!["*".to_string()];
        assert!(is_origin_allowed("https://example.com", &origins));
        assert!(is_origin_allowed("http://localhost:5173", &origins));
    }

    #[test]
    fn test_is_origin_allowed_exact_match() {
        let origins = vec![
            "https://cafe-between.ru".to_string(),
            "http://localhost:5173".to_string(),
        ];
        assert!(is_origin_allowed("https://cafe-between.ru", &origins));
        assert!(is_origin_allowed("http://localhost:5173", &origins));
        assert!(!is_origin_allowed("https://evil.com", &origins));
    }

    #[test]
    fn test_is_origin_allowed_wildcard_subdomain() {
        let origins = vec!["*.cafe-between.ru".to_string()];
        assert!(is_origin_allowed("https://admin.cafe-between.ru", &origins));
        assert!(!is_origin_allowed("https://cafe-between.ru", &origins));
        assert!(!is_origin_allowed("https://evilcafe-between.ru", &origins));
    }

    #[test]
    fn test_is_origin_allowed_empty_list() {
        assert!(!is_origin_allowed("https://example.com", &[]));
    }
}
