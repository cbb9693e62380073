//! Menu category endpoints

use crate::{
    cache::{CATEGORIES_KEY, Lookup},
    handlers::{ApiResult, api_error, from_core},
    state::AppState,
};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use cafe_core::MenuCategory;
use cafe_database::CategoryQueries;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Body of a sort order update
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SortOrderRequest {
    /// New display position
    pub sort_order: i32,
}

/// Categories in display order, served from the response cache when fresh
pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Arc<Value>>> {
    let generation = match state.cache.lookup(CATEGORIES_KEY) {
        Lookup::Hit(cached) => return Ok(Json(cached)),
        Lookup::Miss(generation) => generation,
    };

    let categories: Vec<MenuCategory> = CategoryQueries::list(&state.pool)
        .await
        .map_err(from_core)?
        .into_iter()
        .map(MenuCategory::from)
        .collect();
    let payload = serde_json::to_value(&categories).map_err(|e| from_core(e.into()))?;
    Ok(Json(state.cache.insert(CATEGORIES_KEY, generation, payload)))
}

/// Move a category to a new display position
pub async fn update_sort_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Result<Json<SortOrderRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = body.map_err(|e| {
        warn!("Malformed sort order request: {}", e);
        api_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", "Invalid request body")
    })?;

    CategoryQueries::update_sort_order(&state.pool, id, request.sort_order)
        .await
        .map_err(from_core)?;

    state.cache.invalidate_menu();
    info!(id, sort_order = request.sort_order, "Category sort order updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a category nothing references
///
/// Responds 409 with the referencing item titles in `details.items` otherwise.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    CategoryQueries::delete(&state.pool, id)
        .await
        .map_err(from_core)?;

    state.cache.invalidate_menu();
    info!(id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
