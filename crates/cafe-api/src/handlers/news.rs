//! News endpoints

use crate::{
    forms::{NewsForm, read_multipart},
    handlers::{ApiResult, from_core, menu::discard_uploads},
    images::unreferenced,
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use cafe_core::{Error, NewsItem};
use cafe_database::{NewsItemRecord, NewsQueries};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Published news, newest first
pub async fn list_news(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<NewsItem>>> {
    let items = NewsQueries::list_published(&state.pool, Utc::now())
        .await
        .map_err(from_core)?;
    Ok(Json(items.into_iter().map(NewsItem::from).collect()))
}

/// One published news item; scheduled items look absent
pub async fn get_news_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<NewsItem>> {
    let item: NewsItem = NewsQueries::find_by_id(&state.pool, id)
        .await
        .map_err(from_core)?
        .into();
    if !item.is_published(Utc::now()) {
        return Err(from_core(Error::not_found(format!("News item {id}"))));
    }
    Ok(Json(item))
}

/// All news including scheduled items
pub async fn admin_list_news(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<NewsItem>>> {
    let items = NewsQueries::list_all(&state.pool).await.map_err(from_core)?;
    Ok(Json(items.into_iter().map(NewsItem::from).collect()))
}

/// Create a news item from a multipart form
pub async fn create_news_item(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<NewsItem>)> {
    let form = NewsForm::try_from(read_multipart(multipart).await?)?;
    let uploaded = state.images.save_all(&form.images).await.map_err(from_core)?;

    let record = record_from(&form, &uploaded);
    let created = match NewsQueries::insert(&state.pool, &record).await {
        Ok(created) => created,
        Err(e) => {
            discard_uploads(&state, &uploaded).await;
            return Err(from_core(e));
        }
    };

    info!(id = created.id, title = %created.title, "News item created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replace a news item from a multipart form
pub async fn update_news_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<StatusCode> {
    let form = NewsForm::try_from(read_multipart(multipart).await?)?;
    let current = NewsQueries::find_by_id(&state.pool, id)
        .await
        .map_err(from_core)?;
    let uploaded = state.images.save_all(&form.images).await.map_err(from_core)?;

    let record = record_from(&form, &uploaded);
    let updated = match NewsQueries::update(&state.pool, id, &record).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_uploads(&state, &uploaded).await;
            return Err(from_core(e));
        }
    };

    discard_uploads(&state, &unreferenced(&current.image_urls, &updated.image_urls)).await;
    info!(id, title = %updated.title, "News item updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a news item with its uploaded images
pub async fn delete_news_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let removed = NewsQueries::delete(&state.pool, id)
        .await
        .map_err(from_core)?;
    discard_uploads(&state, &removed.image_urls).await;

    info!(id, title = %removed.title, "News item deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn record_from(form: &NewsForm, uploaded: &[String]) -> NewsItemRecord {
    let mut image_urls = form.existing_images.clone();
    image_urls.extend(uploaded.iter().cloned());
    NewsItemRecord {
        title: form.draft.title.clone(),
        preview: form.draft.preview.clone(),
        description: form.draft.description.clone(),
        image_urls,
        posted_at: form.draft.posted_at,
    }
}
