//! Category ordering and deletion

use crate::api::CafeApi;
use crate::notifications::NotificationQueue;
use cafe_core::{CategoryId, MenuCategory};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Move the entry at `from` to `to` and renumber sort orders from zero
///
/// Returns `None` when either index is out of range.
#[must_use]
pub fn reorder(categories: &[MenuCategory], from: usize, to: usize) -> Option<Vec<MenuCategory>> {
    if from >= categories.len() || to >= categories.len() {
        return None;
    }
    let mut reordered = categories.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    for (position, category) in reordered.iter_mut().enumerate() {
        category.sort_order = i32::try_from(position).unwrap_or(i32::MAX);
    }
    Some(reordered)
}

/// Category list with optimistic reordering
#[derive(Debug)]
pub struct CategoryReorder {
    api: Arc<dyn CafeApi>,
    categories: Vec<MenuCategory>,
}

impl CategoryReorder {
    /// Create an empty list
    #[must_use]
    pub fn new(api: Arc<dyn CafeApi>) -> Self {
        Self {
            api,
            categories: Vec::new(),
        }
    }

    /// Fetch categories in display order
    pub async fn load(&mut self, notes: &mut NotificationQueue) -> bool {
        match self.api.fetch_categories().await {
            Ok(categories) => {
                self.categories = categories;
                true
            }
            Err(e) => {
                warn!("Failed to load categories: {}", e);
                notes.error("Failed to load categories");
                false
            }
        }
    }

    /// Categories as currently displayed
    #[must_use]
    pub fn categories(&self) -> &[MenuCategory] {
        &self.categories
    }

    /// Show the moved order right away, returning the order it replaced
    pub fn apply_move(&mut self, from: usize, to: usize) -> Option<Vec<MenuCategory>> {
        let reordered = reorder(&self.categories, from, to)?;
        Some(std::mem::replace(&mut self.categories, reordered))
    }

    /// Persist the displayed order, one call per category in parallel
    ///
    /// On any rejection the displayed order is replaced by the server's, or
    /// by `previous` when that cannot be fetched either.
    pub async fn persist(
        &mut self,
        token: &str,
        previous: Vec<MenuCategory>,
        notes: &mut NotificationQueue,
    ) -> bool {
        let results = join_all(self.categories.iter().map(|c| {
            self.api
                .update_category_sort_order(token, c.id, c.sort_order)
        }))
        .await;

        if results.iter().all(Result::is_ok) {
            info!("Category order saved");
            notes.success("Category order updated");
            return true;
        }

        warn!("Category reorder rejected, reloading");
        notes.error("Failed to update category order");
        match self.api.fetch_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => {
                warn!("Failed to reload categories: {}", e);
                self.categories = previous;
            }
        }
        false
    }

    /// Move a category and save the new order
    pub async fn move_category(
        &mut self,
        token: &str,
        from: usize,
        to: usize,
        notes: &mut NotificationQueue,
    ) -> bool {
        if from == to && from < self.categories.len() {
            return true;
        }
        let Some(previous) = self.apply_move(from, to) else {
            notes.warning("Invalid category position");
            return false;
        };
        self.persist(token, previous, notes).await
    }

    /// Delete a category, naming the items that still use it on refusal
    pub async fn delete_category(
        &mut self,
        token: &str,
        id: CategoryId,
        notes: &mut NotificationQueue,
    ) -> bool {
        match self.api.delete_category(token, id).await {
            Ok(()) => {
                self.categories.retain(|c| c.id != id);
                notes.success("Category deleted");
                true
            }
            Err(e) if e.status() == Some(409) => {
                let titles = e.conflict_items();
                notes.error(format!("Cannot delete category: used by {}", titles.join(", ")));
                false
            }
            Err(e) => {
                warn!("Failed to delete category {}: {}", id, e);
                notes.error("Failed to delete category");
                false
            }
        }
    }
}
