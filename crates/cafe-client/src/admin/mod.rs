//! Admin panel workflows

pub mod categories;
pub mod menu;
pub mod news;

pub use categories::CategoryReorder;
pub use menu::MenuAdmin;
pub use news::NewsAdmin;

use crate::error::Result;
use std::collections::BTreeSet;

/// Raised when local validation blocks a submit
pub const FIX_FORM_ERRORS: &str = "Please fix the form errors";

/// Raised when a create or update is rejected
pub const SAVE_FAILED: &str = "Failed to save item";

/// Raised when any delete of a bulk delete fails
pub const BULK_DELETE_FAILED: &str = "Failed to delete some items";

/// Ids ticked in an admin table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<i32>);

impl Selection {
    /// Tick or untick one id
    pub fn toggle(&mut self, id: i32) {
        if !self.0.remove(&id) {
            self.0.insert(id);
        }
    }

    /// Tick exactly `ids`
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = i32>) {
        self.0 = ids.into_iter().collect();
    }

    /// Untick everything
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Forget ids that no longer exist
    pub fn retain(&mut self, existing: &BTreeSet<i32>) {
        self.0.retain(|id| existing.contains(id));
    }

    /// True when `id` is ticked
    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        self.0.contains(&id)
    }

    /// Ticked ids in ascending order
    #[must_use]
    pub fn ids(&self) -> Vec<i32> {
        self.0.iter().copied().collect()
    }

    /// Number of ticked ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is ticked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Case-insensitive substring match over any of `fields`
fn matches_search(search: &str, fields: &[Option<&str>]) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || fields
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// Success message for a finished bulk delete
fn bulk_deleted(count: usize) -> String {
    format!("{count} items deleted successfully")
}

fn all_succeeded(results: &[Result<()>]) -> bool {
    results.iter().all(std::result::Result::is_ok)
}
