//! API route definitions and middleware stack

use crate::{handlers, middleware, state::AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Public read-only endpoints and login
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/menu", get(handlers::menu::list_menu))
        .route("/api/menu/:id", get(handlers::menu::get_menu_item))
        .route(
            "/api/menu-categories",
            get(handlers::categories::list_categories),
        )
        .route("/api/news", get(handlers::news::list_news))
        .route("/api/news/:id", get(handlers::news::get_news_item))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
}

/// Endpoints that require an admin token
pub fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/menu",
            get(handlers::menu::admin_list_menu).post(handlers::menu::create_menu_item),
        )
        .route(
            "/api/admin/menu/:id",
            put(handlers::menu::update_menu_item).delete(handlers::menu::delete_menu_item),
        )
        .route(
            "/api/admin/menu-categories/:id",
            axum::routing::delete(handlers::categories::delete_category),
        )
        .route(
            "/api/menu-categories/:id/sort-order",
            put(handlers::categories::update_sort_order),
        )
        .route(
            "/api/admin/news",
            get(handlers::news::admin_list_news).post(handlers::news::create_news_item),
        )
        .route(
            "/api/admin/news/:id",
            put(handlers::news::update_news_item).delete(handlers::news::delete_news_item),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

/// Build health check routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// Assemble every route with the shared middleware stack
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.config.storage.max_form_size).unwrap_or(usize::MAX);
    let uploads = ServeDir::new(&state.upload_dir);

    Router::new()
        .merge(public_routes())
        .merge(admin_routes(Arc::clone(&state)))
        .merge(health_routes())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::cors::cors_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
