//! In-memory `CafeApi` used by the workflow tests

#![allow(clippy::unwrap_used)]

use crate::api::CafeApi;
use crate::error::{ClientError, Result};
use crate::forms::{MenuSubmission, NewsSubmission};
use async_trait::async_trait;
use cafe_core::{CategoryId, MenuCategory, MenuItem, MenuItemId, NewsId, NewsItem};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct FakeState {
    menu: Vec<MenuItem>,
    news: Vec<NewsItem>,
    categories: Vec<MenuCategory>,
    next_id: i32,
    failures: HashSet<(String, Option<i32>)>,
    calls: HashMap<String, usize>,
    sort_updates: Vec<(CategoryId, i32)>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

pub fn menu_item(id: MenuItemId, title: &str, category: &str) -> MenuItem {
    MenuItem {
        id,
        title: title.to_string(),
        price: 200,
        image_urls: Vec::new(),
        calories: None,
        description: None,
        category: category.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn news_item(id: NewsId, title: &str, posted_at: DateTime<Utc>) -> NewsItem {
    NewsItem {
        id,
        title: title.to_string(),
        preview: None,
        description: None,
        image_urls: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        posted_at,
    }
}

pub fn category(id: CategoryId, name_ru: &str, name_en: &str, sort_order: i32) -> MenuCategory {
    MenuCategory {
        id,
        name_ru: name_ru.to_string(),
        name_en: name_en.to_string(),
        sort_order,
        created_at: Utc::now(),
    }
}

fn http(status: u16, message: &str) -> ClientError {
    ClientError::Http {
        status,
        message: message.to_string(),
        details: None,
    }
}

impl FakeApi {
    pub const PASSWORD: &'static str = "barista";
    pub const TOKEN: &'static str = "fake-token";

    pub fn with_menu(self, menu: Vec<MenuItem>) -> Self {
        {
            let mut state = self.state.lock();
            state.next_id = state.next_id.max(menu.iter().map(|m| m.id).max().unwrap_or(0));
            state.menu = menu;
        }
        self
    }

    pub fn with_news(self, news: Vec<NewsItem>) -> Self {
        {
            let mut state = self.state.lock();
            state.next_id = state.next_id.max(news.iter().map(|n| n.id).max().unwrap_or(0));
            state.news = news;
        }
        self
    }

    pub fn with_categories(self, categories: Vec<MenuCategory>) -> Self {
        self.state.lock().categories = categories;
        self
    }

    /// Make every call of `op` fail
    pub fn fail(&self, op: &str) {
        self.state.lock().failures.insert((op.to_string(), None));
    }

    /// Make `op` fail for one id
    pub fn fail_on(&self, op: &str, id: i32) {
        self.state.lock().failures.insert((op.to_string(), Some(id)));
    }

    /// Let every call succeed again
    pub fn recover(&self) {
        self.state.lock().failures.clear();
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().calls.get(op).copied().unwrap_or(0)
    }

    pub fn sort_updates(&self) -> Vec<(CategoryId, i32)> {
        self.state.lock().sort_updates.clone()
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        self.state.lock().menu.clone()
    }

    pub fn news(&self) -> Vec<NewsItem> {
        self.state.lock().news.clone()
    }

    fn enter(&self, op: &str, id: Option<i32>) -> Result<()> {
        let mut state = self.state.lock();
        *state.calls.entry(op.to_string()).or_default() += 1;
        let failing = state.failures.contains(&(op.to_string(), None))
            || id.is_some_and(|id| state.failures.contains(&(op.to_string(), Some(id))));
        if failing {
            return Err(http(500, "Internal server error"));
        }
        Ok(())
    }

    fn admin(&self, op: &str, token: &str, id: Option<i32>) -> Result<()> {
        self.enter(op, id)?;
        if token != Self::TOKEN {
            return Err(http(401, "Invalid token"));
        }
        Ok(())
    }
}

#[async_trait]
impl CafeApi for FakeApi {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>> {
        self.enter("fetch_menu", None)?;
        Ok(self.menu())
    }

    async fn fetch_menu_item(&self, id: MenuItemId) -> Result<MenuItem> {
        self.enter("fetch_menu_item", Some(id))?;
        self.menu()
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| http(404, "Menu item not found"))
    }

    async fn fetch_admin_menu(&self, token: &str) -> Result<Vec<MenuItem>> {
        self.admin("fetch_admin_menu", token, None)?;
        Ok(self.menu())
    }

    async fn create_menu_item(&self, token: &str, item: &MenuSubmission) -> Result<MenuItem> {
        self.admin("create_menu_item", token, None)?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let mut created = menu_item(state.next_id, &item.draft.title, &item.draft.category);
        created.price = item.draft.price as i32;
        created.image_urls = item.existing_images.clone();
        state.menu.push(created.clone());
        Ok(created)
    }

    async fn update_menu_item(
        &self,
        token: &str,
        id: MenuItemId,
        item: &MenuSubmission,
    ) -> Result<()> {
        self.admin("update_menu_item", token, Some(id))?;
        let mut state = self.state.lock();
        let existing = state
            .menu
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| http(404, "Menu item not found"))?;
        existing.title = item.draft.title.clone();
        existing.price = item.draft.price as i32;
        existing.category = item.draft.category.clone();
        existing.description = item.draft.description.clone();
        Ok(())
    }

    async fn delete_menu_item(&self, token: &str, id: MenuItemId) -> Result<()> {
        self.admin("delete_menu_item", token, Some(id))?;
        let mut state = self.state.lock();
        let before = state.menu.len();
        state.menu.retain(|m| m.id != id);
        if state.menu.len() == before {
            return Err(http(404, "Menu item not found"));
        }
        Ok(())
    }

    async fn fetch_categories(&self) -> Result<Vec<MenuCategory>> {
        self.enter("fetch_categories", None)?;
        let mut categories = self.state.lock().categories.clone();
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name_ru.cmp(&b.name_ru))
        });
        Ok(categories)
    }

    async fn update_category_sort_order(
        &self,
        token: &str,
        id: CategoryId,
        sort_order: i32,
    ) -> Result<()> {
        self.admin("update_category_sort_order", token, Some(id))?;
        let mut state = self.state.lock();
        state.sort_updates.push((id, sort_order));
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| http(404, "Category not found"))?;
        category.sort_order = sort_order;
        Ok(())
    }

    async fn delete_category(&self, token: &str, id: CategoryId) -> Result<()> {
        self.admin("delete_category", token, Some(id))?;
        let mut state = self.state.lock();
        let category = state
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| http(404, "Category not found"))?;

        let mut titles: Vec<String> = state
            .menu
            .iter()
            .filter(|m| m.category == category.name_en)
            .map(|m| m.title.clone())
            .collect();
        if !titles.is_empty() {
            titles.sort();
            return Err(ClientError::Http {
                status: 409,
                message: format!("Category \"{}\" is used by menu items", category.name_ru),
                details: Some(json!({ "items": titles })),
            });
        }
        state.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
        self.enter("fetch_news", None)?;
        let now = Utc::now();
        Ok(self
            .news()
            .into_iter()
            .filter(|n| n.is_published(now))
            .collect())
    }

    async fn fetch_news_item(&self, id: NewsId) -> Result<NewsItem> {
        self.enter("fetch_news_item", Some(id))?;
        self.news()
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| http(404, "News item not found"))
    }

    async fn fetch_admin_news(&self, token: &str) -> Result<Vec<NewsItem>> {
        self.admin("fetch_admin_news", token, None)?;
        Ok(self.news())
    }

    async fn create_news_item(&self, token: &str, item: &NewsSubmission) -> Result<NewsItem> {
        self.admin("create_news_item", token, None)?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let mut created = news_item(state.next_id, &item.draft.title, item.draft.posted_at);
        created.preview = item.draft.preview.clone();
        created.description = item.draft.description.clone();
        state.news.push(created.clone());
        Ok(created)
    }

    async fn update_news_item(
        &self,
        token: &str,
        id: NewsId,
        item: &NewsSubmission,
    ) -> Result<()> {
        self.admin("update_news_item", token, Some(id))?;
        let mut state = self.state.lock();
        let existing = state
            .news
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| http(404, "News item not found"))?;
        existing.title = item.draft.title.clone();
        existing.preview = item.draft.preview.clone();
        existing.description = item.draft.description.clone();
        existing.posted_at = item.draft.posted_at;
        Ok(())
    }

    async fn delete_news_item(&self, token: &str, id: NewsId) -> Result<()> {
        self.admin("delete_news_item", token, Some(id))?;
        let mut state = self.state.lock();
        let before = state.news.len();
        state.news.retain(|n| n.id != id);
        if state.news.len() == before {
            return Err(http(404, "News item not found"));
        }
        Ok(())
    }

    async fn login(&self, password: &str) -> Result<String> {
        self.enter("login", None)?;
        if password == Self::PASSWORD {
            Ok(Self::TOKEN.to_string())
        } else {
            Err(http(401, "Invalid password"))
        }
    }

    async fn logout(&self) -> Result<()> {
        self.enter("logout", None)
    }
}
