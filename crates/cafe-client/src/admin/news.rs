//! News management workflow

use super::{
    BULK_DELETE_FAILED, FIX_FORM_ERRORS, SAVE_FAILED, Selection, all_succeeded, bulk_deleted,
    matches_search,
};
use crate::api::CafeApi;
use crate::forms::NewsForm;
use crate::notifications::NotificationQueue;
use cafe_core::{FieldErrors, NewsId, NewsItem};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// State of the news admin page
///
/// Scheduled items are listed alongside published ones.
#[derive(Debug)]
pub struct NewsAdmin {
    api: Arc<dyn CafeApi>,
    items: Vec<NewsItem>,
    search: String,
    selection: Selection,
    form: NewsForm,
    editing: Option<NewsId>,
    field_errors: FieldErrors,
}

impl NewsAdmin {
    /// Create an empty page
    #[must_use]
    pub fn new(api: Arc<dyn CafeApi>) -> Self {
        Self {
            api,
            items: Vec::new(),
            search: String::new(),
            selection: Selection::default(),
            form: NewsForm::default(),
            editing: None,
            field_errors: FieldErrors::default(),
        }
    }

    /// Fetch every news item; false and an error notification on failure
    pub async fn load(&mut self, token: &str, notes: &mut NotificationQueue) -> bool {
        match self.api.fetch_admin_news(token).await {
            Ok(items) => {
                let ids: BTreeSet<i32> = items.iter().map(|i| i.id).collect();
                self.selection.retain(&ids);
                self.items = items;
                true
            }
            Err(e) => {
                warn!("Failed to load admin news: {}", e);
                notes.error("Failed to load news");
                false
            }
        }
    }

    /// Every loaded item
    #[must_use]
    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    /// Set the free-text search
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Items passing the search
    #[must_use]
    pub fn filtered(&self) -> Vec<&NewsItem> {
        self.items
            .iter()
            .filter(|item| {
                matches_search(
                    &self.search,
                    &[
                        Some(item.title.as_str()),
                        item.preview.as_deref(),
                        item.description.as_deref(),
                    ],
                )
            })
            .collect()
    }

    /// Loaded items not yet visible to the public
    #[must_use]
    pub fn scheduled(&self, now: DateTime<Utc>) -> Vec<&NewsItem> {
        self.items.iter().filter(|n| !n.is_published(now)).collect()
    }

    /// Tick or untick an item
    pub fn toggle_selection(&mut self, id: NewsId) {
        self.selection.toggle(id);
    }

    /// Tick every item currently shown
    pub fn select_all(&mut self) {
        let ids: Vec<i32> = self.filtered().iter().map(|i| i.id).collect();
        self.selection.select_all(ids);
    }

    /// Untick everything
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Ticked items
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Load an item into the form for editing
    pub fn begin_edit(&mut self, item: &NewsItem) {
        self.form = NewsForm::from_item(item);
        self.editing = Some(item.id);
        self.field_errors = FieldErrors::default();
    }

    /// Back to an empty create form
    pub fn reset_form(&mut self) {
        self.form = NewsForm::default();
        self.editing = None;
        self.field_errors = FieldErrors::default();
    }

    /// Current form
    #[must_use]
    pub const fn form(&self) -> &NewsForm {
        &self.form
    }

    /// Form for editing inputs
    pub const fn form_mut(&mut self) -> &mut NewsForm {
        &mut self.form
    }

    /// Item being edited, `None` while creating
    #[must_use]
    pub const fn editing(&self) -> Option<NewsId> {
        self.editing
    }

    /// Messages from the last rejected submit
    #[must_use]
    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Validate and send the form, reloading on success
    pub async fn submit(&mut self, token: &str, notes: &mut NotificationQueue) -> bool {
        let submission = match self.form.submission() {
            Ok(submission) => submission,
            Err(errors) => {
                self.field_errors = errors;
                notes.error(FIX_FORM_ERRORS);
                return false;
            }
        };
        self.field_errors = FieldErrors::default();

        let result = match self.editing {
            Some(id) => self.api.update_news_item(token, id, &submission).await,
            None => self
                .api
                .create_news_item(token, &submission)
                .await
                .map(|_| ()),
        };
        if let Err(e) = result {
            warn!("Failed to save news item: {}", e);
            notes.error(SAVE_FAILED);
            return false;
        }

        notes.success(if self.editing.is_some() {
            "News updated successfully"
        } else {
            "News created successfully"
        });
        self.reset_form();
        self.load(token, notes).await;
        true
    }

    /// Delete one item and reload
    pub async fn delete(&mut self, token: &str, id: NewsId, notes: &mut NotificationQueue) -> bool {
        if let Err(e) = self.api.delete_news_item(token, id).await {
            warn!("Failed to delete news item {}: {}", id, e);
            notes.error("Failed to delete news");
            return false;
        }
        notes.success("News deleted successfully");
        if self.editing == Some(id) {
            self.reset_form();
        }
        self.load(token, notes).await;
        true
    }

    /// Delete every ticked item in parallel
    pub async fn bulk_delete(&mut self, token: &str, notes: &mut NotificationQueue) -> bool {
        let ids = self.selection.ids();
        if ids.is_empty() {
            notes.warning("No items selected");
            return false;
        }

        let results = join_all(ids.iter().map(|&id| self.api.delete_news_item(token, id))).await;
        if !all_succeeded(&results) {
            warn!("Bulk delete of {} news items partly failed", ids.len());
            notes.error(BULK_DELETE_FAILED);
            return false;
        }

        self.selection.clear();
        notes.success(bulk_deleted(ids.len()));
        self.load(token, notes).await;
        true
    }
}
