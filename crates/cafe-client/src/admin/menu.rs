//! Menu management workflow

use super::{
    BULK_DELETE_FAILED, FIX_FORM_ERRORS, SAVE_FAILED, Selection, all_succeeded, bulk_deleted,
    matches_search,
};
use crate::api::CafeApi;
use crate::forms::MenuItemForm;
use crate::notifications::NotificationQueue;
use cafe_core::{FieldErrors, MenuItem, MenuItemId};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// State of the menu admin page
#[derive(Debug)]
pub struct MenuAdmin {
    api: Arc<dyn CafeApi>,
    items: Vec<MenuItem>,
    search: String,
    category_filter: Option<String>,
    selection: Selection,
    form: MenuItemForm,
    editing: Option<MenuItemId>,
    field_errors: FieldErrors,
}

impl MenuAdmin {
    /// Create an empty page
    #[must_use]
    pub fn new(api: Arc<dyn CafeApi>) -> Self {
        Self {
            api,
            items: Vec::new(),
            search: String::new(),
            category_filter: None,
            selection: Selection::default(),
            form: MenuItemForm::default(),
            editing: None,
            field_errors: FieldErrors::default(),
        }
    }

    /// Fetch the whole menu; false and an error notification on failure
    pub async fn load(&mut self, token: &str, notes: &mut NotificationQueue) -> bool {
        match self.api.fetch_admin_menu(token).await {
            Ok(items) => {
                let ids: BTreeSet<i32> = items.iter().map(|i| i.id).collect();
                self.selection.retain(&ids);
                self.items = items;
                true
            }
            Err(e) => {
                warn!("Failed to load admin menu: {}", e);
                notes.error("Failed to load menu");
                false
            }
        }
    }

    /// Every loaded item
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Set the free-text search
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Show only one category, or all with `None`
    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.category_filter = category.filter(|c| !c.is_empty());
    }

    /// Items passing the search and category filter
    #[must_use]
    pub fn filtered(&self) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| {
                self.category_filter
                    .as_deref()
                    .is_none_or(|c| item.category == c)
            })
            .filter(|item| {
                matches_search(
                    &self.search,
                    &[
                        Some(item.title.as_str()),
                        item.description.as_deref(),
                        Some(item.category.as_str()),
                    ],
                )
            })
            .collect()
    }

    /// Distinct categories of the loaded items
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|i| i.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tick or untick an item
    pub fn toggle_selection(&mut self, id: MenuItemId) {
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
    pub fn begin_edit(&mut self, item: &MenuItem) {
        self.form = MenuItemForm::from_item(item);
        self.editing = Some(item.id);
        self.field_errors = FieldErrors::default();
    }

    /// Back to an empty create form
    pub fn reset_form(&mut self) {
        self.form = MenuItemForm::default();
        self.editing = None;
        self.field_errors = FieldErrors::default();
    }

    /// Current form
    #[must_use]
    pub const fn form(&self) -> &MenuItemForm {
        &self.form
    }

    /// Form for editing inputs
    pub const fn form_mut(&mut self) -> &mut MenuItemForm {
        &mut self.form
    }

    /// Item being edited, `None` while creating
    #[must_use]
    pub const fn editing(&self) -> Option<MenuItemId> {
        self.editing
    }

    /// Messages from the last rejected submit
    #[must_use]
    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Validate and send the form
    ///
    /// Invalid input never reaches the server. On success the menu is
    /// reloaded and the form cleared.
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
            Some(id) => self.api.update_menu_item(token, id, &submission).await,
            None => self
                .api
                .create_menu_item(token, &submission)
                .await
                .map(|_| ()),
        };

        if let Err(e) = result {
            warn!("Failed to save menu item: {}", e);
            notes.error(SAVE_FAILED);
            return false;
        }

        let message = if self.editing.is_some() {
            "Item updated successfully"
        } else {
            "Item created successfully"
        };
        info!(title = %submission.draft.title, "{}", message);
        notes.success(message);
        self.reset_form();
        self.load(token, notes).await;
        true
    }

    /// Delete one item and reload
    pub async fn delete(
        &mut self,
        token: &str,
        id: MenuItemId,
        notes: &mut NotificationQueue,
    ) -> bool {
        if let Err(e) = self.api.delete_menu_item(token, id).await {
            warn!("Failed to delete menu item {}: {}", id, e);
            notes.error("Failed to delete item");
            return false;
        }
        notes.success("Item deleted successfully");
        if self.editing == Some(id) {
            self.reset_form();
        }
        self.load(token, notes).await;
        true
    }

    /// Delete every ticked item in parallel
    ///
    /// Any failure produces a single error notification and leaves the
    /// selection and list as they were.
    pub async fn bulk_delete(&mut self, token: &str, notes: &mut NotificationQueue) -> bool {
        let ids = self.selection.ids();
        if ids.is_empty() {
            notes.warning("No items selected");
            return false;
        }

        let results = join_all(ids.iter().map(|&id| self.api.delete_menu_item(token, id))).await;
        if !all_succeeded(&results) {
            warn!("Bulk delete of {} menu items partly failed", ids.len());
            notes.error(BULK_DELETE_FAILED);
            return false;
        }

        self.selection.clear();
        notes.success(bulk_deleted(ids.len()));
        self.load(token, notes).await;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, menu_item};
    use pretty_assertions::assert_eq;

    const TOKEN: &str = FakeApi::TOKEN;

    async fn loaded(api: &Arc<FakeApi>) -> (MenuAdmin, NotificationQueue) {
        let mut admin = MenuAdmin::new(api.clone());
        let mut notes = NotificationQueue::new();
        assert!(admin.load(TOKEN, &mut notes).await);
        (admin, notes)
    }

    fn sample_api() -> Arc<FakeApi> {
        let mut latte = menu_item(1, "Latte", "napitki");
        latte.description = Some("Milk and espresso".to_string());
        Arc::new(FakeApi::default().with_menu(vec![
            latte,
            menu_item(2, "Americano", "napitki"),
            menu_item(3, "Cheesecake", "deserty"),
        ]))
    }

    #[tokio::test]
    async fn test_filters() {
        let api = sample_api();
        let (mut admin, _) = loaded(&api).await;

        assert_eq!(admin.categories(), vec!["deserty", "napitki"]);

        admin.set_search("ESPRESSO");
        let titles: Vec<&str> = admin.filtered().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Latte"]);

        admin.set_search("");
        admin.set_category_filter(Some("deserty".to_string()));
        admin.select_all();
        assert_eq!(admin.selection().ids(), vec![3]);
    }

    #[tokio::test]
    async fn test_invalid_price_never_reaches_server() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;

        let form = admin.form_mut();
        form.title = "Flat white".to_string();
        form.price = "0".to_string();
        form.category = "Напитки".to_string();

        assert!(!admin.submit(TOKEN, &mut notes).await);
        assert_eq!(
            admin.field_errors().get("price"),
            Some("Price must be greater than 0")
        );
        assert_eq!(notes.latest().unwrap().message, FIX_FORM_ERRORS);
        assert_eq!(api.calls("create_menu_item"), 0);
    }

    #[tokio::test]
    async fn test_create_then_edit() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;

        let form = admin.form_mut();
        form.title = "Flat white".to_string();
        form.price = "260".to_string();
        form.category = "napitki".to_string();
        assert!(admin.submit(TOKEN, &mut notes).await);
        assert_eq!(notes.latest().unwrap().message, "Item created successfully");
        assert_eq!(admin.items().len(), 4);
        assert_eq!(admin.form(), &MenuItemForm::default());

        let americano = admin.items()[1].clone();
        admin.begin_edit(&americano);
        admin.form_mut().price = "180".to_string();
        assert!(admin.submit(TOKEN, &mut notes).await);
        assert_eq!(notes.latest().unwrap().message, "Item updated successfully");
        assert_eq!(admin.items()[1].price, 180);
        assert_eq!(admin.editing(), None);
    }

    #[tokio::test]
    async fn test_save_failure_notifies() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;
        api.fail("create_menu_item");

        let form = admin.form_mut();
        form.title = "Flat white".to_string();
        form.price = "260".to_string();
        form.category = "napitki".to_string();
        assert!(!admin.submit(TOKEN, &mut notes).await);
        assert_eq!(notes.latest().unwrap().message, SAVE_FAILED);
        assert_eq!(admin.form().title, "Flat white");
    }

    #[tokio::test]
    async fn test_bulk_delete_clears_selection_and_reloads() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;

        admin.toggle_selection(1);
        admin.toggle_selection(3);
        assert!(admin.bulk_delete(TOKEN, &mut notes).await);

        assert!(admin.selection().is_empty());
        let ids: Vec<i32> = admin.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(notes.latest().unwrap().message, "2 items deleted successfully");
        assert_eq!(api.calls("delete_menu_item"), 2);
    }

    #[tokio::test]
    async fn test_bulk_delete_partial_failure() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;
        api.fail_on("delete_menu_item", 3);

        admin.toggle_selection(1);
        admin.toggle_selection(3);
        assert!(!admin.bulk_delete(TOKEN, &mut notes).await);

        assert_eq!(notes.latest().unwrap().message, BULK_DELETE_FAILED);
        assert_eq!(notes.len(), 1);
        assert_eq!(admin.selection().len(), 2);
        // No reload: the successful delete is not reflected yet
        assert_eq!(admin.items().len(), 3);
        assert_eq!(api.menu().len(), 2);
    }

    #[tokio::test]
    async fn test_single_delete() {
        let api = sample_api();
        let (mut admin, mut notes) = loaded(&api).await;

        assert!(admin.delete(TOKEN, 2, &mut notes).await);
        assert_eq!(admin.items().len(), 2);
        assert!(!admin.delete(TOKEN, 2, &mut notes).await);
        assert_eq!(notes.latest().unwrap().message, "Failed to delete item");
    }
}
