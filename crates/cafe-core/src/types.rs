//! Core data types for the cafe website

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

/// Longest accepted menu or news description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 250;

/// Longest accepted news preview, in characters
pub const MAX_PREVIEW_CHARS: usize = 50;

/// Menu item identifier type
pub type MenuItemId = i32;

/// Category identifier type
pub type CategoryId = i32;

/// News item identifier type
pub type NewsId = i32;

/// A dish or drink on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Unique identifier
    pub id: MenuItemId,

    /// Display title
    pub title: String,

    /// Price in whole roubles
    pub price: i32,

    /// Image references, either `/uploads/...` paths or absolute URLs
    #[serde(rename = "imageURLs", default)]
    pub image_urls: Vec<String>,

    /// Energy value, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i32>,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category key (the category's `name_en`)
    pub category: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A menu section; `sort_order` defines the display sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    /// Unique identifier
    pub id: CategoryId,

    /// Russian display name
    pub name_ru: String,

    /// Transliterated key referenced by menu items
    pub name_en: String,

    /// Position in the menu, ascending
    pub sort_order: i32,

    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A news or event post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Unique identifier
    pub id: NewsId,

    /// Headline
    pub title: String,

    /// One-line teaser shown in lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image references
    #[serde(rename = "imageURLs", default)]
    pub image_urls: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Publication time; the item stays hidden from the public until then
    pub posted_at: DateTime<Utc>,
}

impl NewsItem {
    /// Whether the public may see this item at `now`
    #[must_use]
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.posted_at <= now
    }
}

/// Editable fields of a menu item, as submitted by the admin form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct MenuItemDraft {
    /// Display title
    #[validate(custom(function = "non_blank", message = "Title is required"))]
    pub title: String,

    /// Price as typed; the server keeps whole roubles
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,

    /// Energy value
    pub calories: Option<i32>,

    /// Short description
    #[validate(length(max = 250, message = "Description too long"))]
    pub description: Option<String>,

    /// Category display name (Russian) or existing key
    #[validate(custom(function = "non_blank", message = "Category is required"))]
    pub category: String,
}

/// Editable fields of a news item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewsDraft {
    /// Headline
    #[validate(custom(function = "non_blank", message = "Title is required"))]
    pub title: String,

    /// One-line teaser
    #[validate(length(max = 50, message = "Preview too long"))]
    pub preview: Option<String>,

    /// Body text
    #[validate(length(max = 250, message = "Description too long"))]
    pub description: Option<String>,

    /// Publication time
    pub posted_at: DateTime<Utc>,
}

impl Default for NewsDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            preview: None,
            description: None,
            posted_at: Utc::now(),
        }
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Record a message for a field, keeping the first one
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// True when every field passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = Self::default();
        for (field, errs) in errors.field_errors() {
            let message = errs
                .first()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string)
                })
                .unwrap_or_default();
            out.insert(field.to_string(), message);
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Run the derived rules and collect the failures per field
///
/// # Errors
///
/// Returns the failing fields when any rule is violated.
pub fn check<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(|e| FieldErrors::from(&e))
}

/// Cut `value` to at most `max` characters, as the admin inputs do while typing
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Trim and drop empty optional text
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
