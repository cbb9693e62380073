//! The REST operations the client relies on

use crate::error::Result;
use crate::forms::{MenuSubmission, NewsSubmission};
use async_trait::async_trait;
use cafe_core::{CategoryId, MenuCategory, MenuItem, MenuItemId, NewsId, NewsItem};

/// Cafe REST API as seen by the views and admin workflows
///
/// Admin operations take the bearer token explicitly.
#[async_trait]
pub trait CafeApi: Send + Sync + std::fmt::Debug {
    /// Public menu
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>>;

    /// One menu item
    async fn fetch_menu_item(&self, id: MenuItemId) -> Result<MenuItem>;

    /// Menu for the admin panel
    async fn fetch_admin_menu(&self, token: &str) -> Result<Vec<MenuItem>>;

    /// Create a menu item
    async fn create_menu_item(&self, token: &str, item: &MenuSubmission) -> Result<MenuItem>;

    /// Replace a menu item
    async fn update_menu_item(
        &self,
        token: &str,
        id: MenuItemId,
        item: &MenuSubmission,
    ) -> Result<()>;

    /// Delete a menu item
    async fn delete_menu_item(&self, token: &str, id: MenuItemId) -> Result<()>;

    /// Categories in display order
    async fn fetch_categories(&self) -> Result<Vec<MenuCategory>>;

    /// Move a category to a new display position
    async fn update_category_sort_order(
        &self,
        token: &str,
        id: CategoryId,
        sort_order: i32,
    ) -> Result<()>;

    /// Delete a category nothing references
    async fn delete_category(&self, token: &str, id: CategoryId) -> Result<()>;

    /// Published news
    async fn fetch_news(&self) -> Result<Vec<NewsItem>>;

    /// One published news item
    async fn fetch_news_item(&self, id: NewsId) -> Result<NewsItem>;

    /// All news, scheduled included
    async fn fetch_admin_news(&self, token: &str) -> Result<Vec<NewsItem>>;

    /// Create a news item
    async fn create_news_item(&self, token: &str, item: &NewsSubmission) -> Result<NewsItem>;

    /// Replace a news item
    async fn update_news_item(&self, token: &str, id: NewsId, item: &NewsSubmission)
    -> Result<()>;

    /// Delete a news item
    async fn delete_news_item(&self, token: &str, id: NewsId) -> Result<()>;

    /// Exchange the admin password for a token
    async fn login(&self, password: &str) -> Result<String>;

    /// Tell the server the session ended
    async fn logout(&self) -> Result<()>;
}
