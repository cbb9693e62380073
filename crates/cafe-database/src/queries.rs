//! Database query operations for the cafe website

use crate::models::{MenuCategoryDb, MenuItemDb, MenuItemRecord, NewsItemDb, NewsItemRecord};
use cafe_core::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

fn db_error(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

fn not_found_or_db(resource: String) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| match e {
        sqlx::Error::RowNotFound => Error::NotFound { resource },
        _ => db_error(e),
    }
}

/// Menu item database operations
#[derive(Debug)]
pub struct MenuQueries;

impl MenuQueries {
    /// List every menu item
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(pool: &PgPool) -> Result<Vec<MenuItemDb>> {
        sqlx::query_as::<_, MenuItemDb>("SELECT * FROM menu ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(db_error)
    }

    /// Find a menu item by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the item is not found.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<MenuItemDb> {
        sqlx::query_as::<_, MenuItemDb>("SELECT * FROM menu WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("Menu item {id}")))
    }

    /// Insert a new menu item
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert(pool: &PgPool, record: &MenuItemRecord) -> Result<MenuItemDb> {
        let query = r"
            INSERT INTO menu (title, price, image_urls, calories, description, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        ";

        sqlx::query_as::<_, MenuItemDb>(query)
            .bind(&record.title)
            .bind(record.price)
            .bind(&record.image_urls)
            .bind(record.calories)
            .bind(&record.description)
            .bind(&record.category)
            .fetch_one(pool)
            .await
            .map_err(db_error)
    }

    /// Replace the editable fields of a menu item
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has this ID.
    pub async fn update(pool: &PgPool, id: i32, record: &MenuItemRecord) -> Result<MenuItemDb> {
        let query = r"
            UPDATE menu
            SET title = $1, price = $2, image_urls = $3, calories = $4,
                description = $5, category = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
        ";

        sqlx::query_as::<_, MenuItemDb>(query)
            .bind(&record.title)
            .bind(record.price)
            .bind(&record.image_urls)
            .bind(record.calories)
            .bind(&record.description)
            .bind(&record.category)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("Menu item {id}")))
    }

    /// Delete a menu item, returning the removed row
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has this ID.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<MenuItemDb> {
        sqlx::query_as::<_, MenuItemDb>("DELETE FROM menu WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("Menu item {id}")))
    }

    /// Titles of the items filed under a category key
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn titles_in_category(pool: &PgPool, name_en: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT title FROM menu WHERE category = $1 ORDER BY title",
        )
        .bind(name_en)
        .fetch_all(pool)
        .await
        .map_err(db_error)
    }
}

/// Menu category database operations
#[derive(Debug)]
pub struct CategoryQueries;

impl CategoryQueries {
    /// List categories in display order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(pool: &PgPool) -> Result<Vec<MenuCategoryDb>> {
        sqlx::query_as::<_, MenuCategoryDb>(
            "SELECT * FROM menu_categories ORDER BY sort_order, name_ru",
        )
        .fetch_all(pool)
        .await
        .map_err(db_error)
    }

    /// Find a category by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the category is not found.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<MenuCategoryDb> {
        sqlx::query_as::<_, MenuCategoryDb>("SELECT * FROM menu_categories WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("Menu category {id}")))
    }

    /// Find a category by its Russian name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name_ru(pool: &PgPool, name_ru: &str) -> Result<Option<MenuCategoryDb>> {
        sqlx::query_as::<_, MenuCategoryDb>("SELECT * FROM menu_categories WHERE name_ru = $1")
            .bind(name_ru)
            .fetch_optional(pool)
            .await
            .map_err(db_error)
    }

    /// Get or create the category for a menu form submission
    ///
    /// An existing row matching either name is returned unchanged. New
    /// categories are appended after the current last one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure(pool: &PgPool, name_ru: &str, name_en: &str) -> Result<MenuCategoryDb> {
        let existing = r"
            SELECT * FROM menu_categories
            WHERE name_ru = $1 OR name_en = $2
            ORDER BY (name_ru = $1) DESC
            LIMIT 1
        ";

        if let Some(category) = sqlx::query_as::<_, MenuCategoryDb>(existing)
            .bind(name_ru)
            .bind(name_en)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
        {
            return Ok(category);
        }

        let insert = r"
            INSERT INTO menu_categories (name_ru, name_en, sort_order)
            SELECT $1, $2, COALESCE(MAX(sort_order) + 1, 0) FROM menu_categories
            ON CONFLICT DO NOTHING
            RETURNING *
        ";

        let created = sqlx::query_as::<_, MenuCategoryDb>(insert)
            .bind(name_ru)
            .bind(name_en)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?;

        match created {
            Some(category) => {
                tracing::info!(name_ru, name_en, id = category.id, "Created menu category");
                Ok(category)
            }
            // Lost a race with a concurrent insert of the same name
            None => sqlx::query_as::<_, MenuCategoryDb>(existing)
                .bind(name_ru)
                .bind(name_en)
                .fetch_one(pool)
                .await
                .map_err(not_found_or_db(format!("Menu category {name_ru}"))),
        }
    }

    /// Set a category's display position
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category has this ID.
    pub async fn update_sort_order(pool: &PgPool, id: i32, sort_order: i32) -> Result<()> {
        let result = sqlx::query("UPDATE menu_categories SET sort_order = $1 WHERE id = $2")
            .bind(sort_order)
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Menu category {id}")));
        }
        Ok(())
    }

    /// Delete a category that no menu item references
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID and `Conflict`, listing the
    /// referencing item titles, when the category is still in use.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<()> {
        let category = Self::find_by_id(pool, id).await?;
        let titles = MenuQueries::titles_in_category(pool, &category.name_en).await?;
        if !titles.is_empty() {
            return Err(Error::Conflict {
                message: format!("Category \"{}\" is used by menu items", category.name_ru),
                details: titles,
            });
        }

        // The NOT EXISTS guard covers an item filed between the check and the delete
        let result = sqlx::query(
            r"
            DELETE FROM menu_categories c
            WHERE c.id = $1
              AND NOT EXISTS (SELECT 1 FROM menu m WHERE m.category = c.name_en)
            ",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            let titles = MenuQueries::titles_in_category(pool, &category.name_en).await?;
            return Err(Error::Conflict {
                message: format!("Category \"{}\" is used by menu items", category.name_ru),
                details: titles,
            });
        }
        Ok(())
    }

    /// Drop a category once its last menu item is gone
    ///
    /// Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_if_unused(pool: &PgPool, name_en: &str) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM menu_categories c
            WHERE c.name_en = $1
              AND NOT EXISTS (SELECT 1 FROM menu m WHERE m.category = c.name_en)
            ",
        )
        .bind(name_en)
        .execute(pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// News database operations
#[derive(Debug)]
pub struct NewsQueries;

impl NewsQueries {
    /// All news, newest publication first, including scheduled items
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<NewsItemDb>> {
        sqlx::query_as::<_, NewsItemDb>("SELECT * FROM news ORDER BY posted_at DESC, id DESC")
            .fetch_all(pool)
            .await
            .map_err(db_error)
    }

    /// News already published at `now`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_published(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<NewsItemDb>> {
        sqlx::query_as::<_, NewsItemDb>(
            "SELECT * FROM news WHERE posted_at <= $1 ORDER BY posted_at DESC, id DESC",
        )
        .bind(now)
        .fetch_all(pool)
        .await
        .map_err(db_error)
    }

    /// Find a news item by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the item is not found.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<NewsItemDb> {
        sqlx::query_as::<_, NewsItemDb>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("News item {id}")))
    }

    /// Insert a news item
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert(pool: &PgPool, record: &NewsItemRecord) -> Result<NewsItemDb> {
        let query = r"
            INSERT INTO news (title, preview, description, image_urls, posted_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        ";

        sqlx::query_as::<_, NewsItemDb>(query)
            .bind(&record.title)
            .bind(&record.preview)
            .bind(&record.description)
            .bind(&record.image_urls)
            .bind(record.posted_at)
            .fetch_one(pool)
            .await
            .map_err(db_error)
    }

    /// Replace the editable fields of a news item
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has this ID.
    pub async fn update(pool: &PgPool, id: i32, record: &NewsItemRecord) -> Result<NewsItemDb> {
        let query = r"
            UPDATE news
            SET title = $1, preview = $2, description = $3, image_urls = $4,
                posted_at = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
        ";

        sqlx::query_as::<_, NewsItemDb>(query)
            .bind(&record.title)
            .bind(&record.preview)
            .bind(&record.description)
            .bind(&record.image_urls)
            .bind(record.posted_at)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("News item {id}")))
    }

    /// Delete a news item, returning the removed row
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has this ID.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<NewsItemDb> {
        sqlx::query_as::<_, NewsItemDb>("DELETE FROM news WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(not_found_or_db(format!("News item {id}")))
    }
}
