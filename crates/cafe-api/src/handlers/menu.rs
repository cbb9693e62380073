//! Menu item endpoints

use crate::{
    cache::{MENU_KEY, Lookup},
    forms::{MenuForm, read_multipart},
    handlers::{ApiResult, from_core},
    images::unreferenced,
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use cafe_core::{MenuItem, utils::transliterate};
use cafe_database::{CategoryQueries, MenuItemDb, MenuItemRecord, MenuQueries};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Public menu, served from the response cache when fresh
pub async fn list_menu(State(state): State<Arc<AppState>>) -> ApiResult<Json<Arc<Value>>> {
    let generation = match state.cache.lookup(MENU_KEY) {
        Lookup::Hit(cached) => return Ok(Json(cached)),
        Lookup::Miss(generation) => generation,
    };

    let items: Vec<MenuItem> = MenuQueries::list(&state.pool)
        .await
        .map_err(from_core)?
        .into_iter()
        .map(MenuItem::from)
        .collect();
    let payload = serde_json::to_value(&items).map_err(|e| from_core(e.into()))?;
    Ok(Json(state.cache.insert(MENU_KEY, generation, payload)))
}

/// One menu item
pub async fn get_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MenuItem>> {
    let item = MenuQueries::find_by_id(&state.pool, id)
        .await
        .map_err(from_core)?;
    Ok(Json(item.into()))
}

/// Full menu for the admin panel, bypassing the cache
pub async fn admin_list_menu(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<MenuItem>>> {
    let items = MenuQueries::list(&state.pool).await.map_err(from_core)?;
    Ok(Json(items.into_iter().map(MenuItem::from).collect()))
}

/// Create a menu item from a multipart form
pub async fn create_menu_item(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    let form = MenuForm::try_from(read_multipart(multipart).await?)?;
    let uploaded = state.images.save_all(&form.images).await.map_err(from_core)?;

    let mut image_urls = form.existing_images.clone();
    image_urls.extend(uploaded.iter().cloned());

    let created = match save_item(&state, None, &form, image_urls).await {
        Ok(created) => created,
        Err(e) => {
            discard_uploads(&state, &uploaded).await;
            return Err(from_core(e));
        }
    };

    state.cache.invalidate_menu();
    info!(id = created.id, title = %created.title, "Menu item created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replace a menu item from a multipart form
///
/// Uploaded images dropped from the item are deleted, as is the previous
/// category once nothing references it.
pub async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<StatusCode> {
    let form = MenuForm::try_from(read_multipart(multipart).await?)?;
    let current = MenuQueries::find_by_id(&state.pool, id)
        .await
        .map_err(from_core)?;
    let uploaded = state.images.save_all(&form.images).await.map_err(from_core)?;

    let mut image_urls = form.existing_images.clone();
    image_urls.extend(uploaded.iter().cloned());

    let updated = match save_item(&state, Some(id), &form, image_urls).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_uploads(&state, &uploaded).await;
            return Err(from_core(e));
        }
    };

    discard_uploads(&state, &unreferenced(&current.image_urls, &updated.image_urls)).await;
    if current.category != updated.category {
        drop_category_if_unused(&state, &current.category).await;
    }

    state.cache.invalidate_menu();
    info!(id, title = %updated.title, "Menu item updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a menu item with its uploaded images
pub async fn delete_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let removed = MenuQueries::delete(&state.pool, id)
        .await
        .map_err(from_core)?;

    discard_uploads(&state, &removed.image_urls).await;
    drop_category_if_unused(&state, &removed.category).await;

    state.cache.invalidate_menu();
    info!(id, title = %removed.title, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// File the item under its category, creating the category on first use
async fn save_item(
    state: &AppState,
    id: Option<i32>,
    form: &MenuForm,
    image_urls: Vec<String>,
) -> cafe_core::Result<MenuItemDb> {
    let name_ru = &form.draft.category;
    let category = CategoryQueries::ensure(&state.pool, name_ru, &transliterate(name_ru)).await?;

    let record = MenuItemRecord {
        title: form.draft.title.clone(),
        price: form.price(),
        image_urls,
        calories: form.draft.calories,
        description: form.draft.description.clone(),
        category: category.name_en,
    };
    match id {
        Some(id) => MenuQueries::update(&state.pool, id, &record).await,
        None => MenuQueries::insert(&state.pool, &record).await,
    }
}

pub(crate) async fn discard_uploads(state: &AppState, urls: &[String]) {
    if let Err(e) = state.images.remove(urls).await {
        warn!("Failed to remove uploaded images: {}", e);
    }
}

async fn drop_category_if_unused(state: &AppState, name_en: &str) {
    match CategoryQueries::delete_if_unused(&state.pool, name_en).await {
        Ok(true) => info!(category = name_en, "Removed unused menu category"),
        Ok(false) => {}
        Err(e) => warn!("Failed to clean up category {}: {}", name_en, e),
    }
}
