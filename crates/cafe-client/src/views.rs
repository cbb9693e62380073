//! Public menu and news views

use crate::api::CafeApi;
use crate::storage::{CATEGORIES_SNAPSHOT, MENU_SNAPSHOT, NEWS_SNAPSHOT, SnapshotCache};
use cafe_core::{MenuCategory, MenuItem, MenuItemId, NewsId, NewsItem};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Number of news items on the home page
pub const HOME_NEWS_LIMIT: usize = 5;

/// Shown when the menu cannot be fetched
pub const MENU_LOAD_FAILED: &str = "Failed to load menu";

/// Shown when the news cannot be fetched
pub const NEWS_LOAD_FAILED: &str = "Failed to load news";

/// Menu items of one category
#[derive(Debug, Clone, PartialEq)]
pub struct MenuGroup {
    /// Category key stored on the items
    pub key: String,
    /// Display name
    pub label: String,
    /// Items in the order received
    pub items: Vec<MenuItem>,
}

/// What a list page renders
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    /// Rows to show
    pub items: Vec<T>,
    /// Error text shown above the list
    pub message: Option<String>,
    /// True when rows come from the local snapshot
    pub from_snapshot: bool,
}

impl<T> ListView<T> {
    fn loaded(items: Vec<T>) -> Self {
        Self {
            items,
            message: None,
            from_snapshot: false,
        }
    }

    fn failed(items: Option<Vec<T>>, message: &str) -> Self {
        Self {
            from_snapshot: items.is_some(),
            items: items.unwrap_or_default(),
            message: Some(message.to_string()),
        }
    }
}

/// Group items by category, ordered by category sort order
///
/// Categories missing from `categories` come after known ones, ordered by key.
#[must_use]
pub fn group_menu(items: Vec<MenuItem>, categories: &[MenuCategory]) -> Vec<MenuGroup> {
    let mut grouped: BTreeMap<String, Vec<MenuItem>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.category.clone()).or_default().push(item);
    }

    let known = |key: &str| {
        categories
            .iter()
            .find(|c| c.name_en == key || c.name_ru == key)
    };

    let mut groups: Vec<MenuGroup> = grouped
        .into_iter()
        .map(|(key, items)| MenuGroup {
            label: known(&key).map_or_else(|| key.clone(), |c| c.name_ru.clone()),
            key,
            items,
        })
        .collect();

    groups.sort_by(|a, b| {
        let rank = |g: &MenuGroup| known(&g.key).map_or((1, 0), |c| (0, c.sort_order));
        rank(a).cmp(&rank(b)).then_with(|| a.key.cmp(&b.key))
    });
    groups
}

/// Published news, newest first
#[must_use]
pub fn published_news(items: Vec<NewsItem>, now: DateTime<Utc>) -> Vec<NewsItem> {
    let mut published: Vec<NewsItem> = items.into_iter().filter(|n| n.is_published(now)).collect();
    published.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    published
}

/// Read-only pages backed by the API with a local snapshot fallback
#[derive(Debug, Clone)]
pub struct PublicSite {
    api: Arc<dyn CafeApi>,
    snapshots: SnapshotCache,
}

impl PublicSite {
    /// Create the views
    #[must_use]
    pub fn new(api: Arc<dyn CafeApi>, snapshots: SnapshotCache) -> Self {
        Self { api, snapshots }
    }

    /// Menu grouped by category
    pub async fn menu(&self) -> ListView<MenuGroup> {
        let (menu, categories) =
            futures::join!(self.api.fetch_menu(), self.api.fetch_categories());

        let categories = match categories {
            Ok(categories) => {
                self.save(CATEGORIES_SNAPSHOT, &categories);
                categories
            }
            Err(e) => {
                warn!("Failed to load categories: {}", e);
                self.snapshots
                    .load(CATEGORIES_SNAPSHOT)
                    .map(|s| s.items)
                    .unwrap_or_default()
            }
        };

        match menu {
            Ok(items) => {
                self.save(MENU_SNAPSHOT, &items);
                ListView::loaded(group_menu(items, &categories))
            }
            Err(e) => {
                warn!("Failed to load menu: {}", e);
                let cached = self
                    .snapshots
                    .load::<MenuItem>(MENU_SNAPSHOT)
                    .map(|s| group_menu(s.items, &categories));
                ListView::failed(cached, MENU_LOAD_FAILED)
            }
        }
    }

    /// Published news, newest first
    pub async fn news(&self, now: DateTime<Utc>) -> ListView<NewsItem> {
        match self.api.fetch_news().await {
            Ok(items) => {
                self.save(NEWS_SNAPSHOT, &items);
                ListView::loaded(published_news(items, now))
            }
            Err(e) => {
                warn!("Failed to load news: {}", e);
                let cached = self
                    .snapshots
                    .load::<NewsItem>(NEWS_SNAPSHOT)
                    .map(|s| published_news(s.items, now));
                ListView::failed(cached, NEWS_LOAD_FAILED)
            }
        }
    }

    /// Latest news for the home page
    pub async fn home(&self, now: DateTime<Utc>) -> ListView<NewsItem> {
        let mut view = self.news(now).await;
        view.items.truncate(HOME_NEWS_LIMIT);
        view
    }

    /// One menu item, `None` when missing or unreachable
    pub async fn menu_item(&self, id: MenuItemId) -> Option<MenuItem> {
        self.api
            .fetch_menu_item(id)
            .await
            .inspect_err(|e| warn!("Failed to load menu item {}: {}", id, e))
            .ok()
    }

    /// One published news item; scheduled ones count as missing
    pub async fn news_item(&self, id: NewsId, now: DateTime<Utc>) -> Option<NewsItem> {
        self.api
            .fetch_news_item(id)
            .await
            .inspect_err(|e| warn!("Failed to load news item {}: {}", id, e))
            .ok()
            .filter(|n| n.is_published(now))
    }

    fn save<T: serde::Serialize>(&self, key: &str, items: &[T]) {
        if let Err(e) = self.snapshots.save(key, items) {
            warn!("Failed to cache {} snapshot: {}", key, e);
        }
    }
}
