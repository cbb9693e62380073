//! Database models for the cafe website

use cafe_core::types::{MenuCategory, MenuItem, NewsItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for menu items
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItemDb {
    /// Unique identifier
    pub id: i32,

    /// Display title
    pub title: String,

    /// Price in whole roubles
    pub price: i32,

    /// Image references
    pub image_urls: Vec<String>,

    /// Energy value
    pub calories: Option<i32>,

    /// Short description
    pub description: Option<String>,

    /// Category key (`menu_categories.name_en`)
    pub category: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Database model for menu categories
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuCategoryDb {
    /// Unique identifier
    pub id: i32,

    /// Russian display name
    pub name_ru: String,

    /// Transliterated key
    pub name_en: String,

    /// Display position
    pub sort_order: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Database model for news items
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsItemDb {
    /// Unique identifier
    pub id: i32,

    /// Headline
    pub title: String,

    /// Teaser
    pub preview: Option<String>,

    /// Body text
    pub description: Option<String>,

    /// Image references
    pub image_urls: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Publication time
    pub posted_at: DateTime<Utc>,
}

/// Column values written by menu inserts and updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemRecord {
    /// Display title
    pub title: String,
    /// Price in whole roubles
    pub price: i32,
    /// Image references
    pub image_urls: Vec<String>,
    /// Energy value
    pub calories: Option<i32>,
    /// Short description
    pub description: Option<String>,
    /// Category key
    pub category: String,
}

/// Column values written by news inserts and updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItemRecord {
    /// Headline
    pub title: String,
    /// Teaser
    pub preview: Option<String>,
    /// Body text
    pub description: Option<String>,
    /// Image references
    pub image_urls: Vec<String>,
    /// Publication time
    pub posted_at: DateTime<Utc>,
}

impl From<MenuItemDb> for MenuItem {
    fn from(row: MenuItemDb) -> Self {
        Self {
            id: row.id,
            title: row.title,
            price: row.price,
            image_urls: row.image_urls,
            calories: row.calories,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<MenuCategoryDb> for MenuCategory {
    fn from(row: MenuCategoryDb) -> Self {
        Self {
            id: row.id,
            name_ru: row.name_ru,
            name_en: row.name_en,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

impl From<NewsItemDb> for NewsItem {
    fn from(row: NewsItemDb) -> Self {
        Self {
            id: row.id,
            title: row.title,
            preview: row.preview,
            description: row.description,
            image_urls: row.image_urls,
            created_at: row.created_at,
            updated_at: row.updated_at,
            posted_at: row.posted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_menu_row_conversion_keeps_fields() {
        let now = Utc::now();
        let row = MenuItemDb {
            id: 7,
            title: "Syrniki".to_string(),
            price: 320,
            image_urls: vec!["/uploads/s.jpg".to_string()],
            calories: None,
            description: Some("With sour cream".to_string()),
            category: "zavtraki".to_string(),
            created_at: now,
            updated_at: now,
        };

        let item = MenuItem::from(row);
        assert_eq!(item.id, 7);
        assert_eq!(item.price, 320);
        assert_eq!(item.category, "zavtraki");
        assert_eq!(item.image_urls, vec!["/uploads/s.jpg"]);
    }

    #[test]
    fn test_news_row_conversion_keeps_posted_at() {
        let now = Utc::now();
        let posted = now + chrono::Duration::days(2);
        let row = NewsItemDb {
            id: 1,
            title: "Jazz".to_string(),
            preview: Some("Friday".to_string()),
            description: None,
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
            posted_at: posted,
        };

        let item = NewsItem::from(row);
        assert_eq!(item.posted_at, posted);
        assert!(!item.is_published(now));
    }
}
