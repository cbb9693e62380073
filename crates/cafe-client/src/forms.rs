//! Admin edit forms and their validation

use cafe_core::{
    FieldErrors, MenuItem, MenuItemDraft, NewsDraft, NewsItem,
    types::{MAX_DESCRIPTION_CHARS, MAX_PREVIEW_CHARS, check, non_empty, truncate_chars},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

/// A file chosen for upload but not yet sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Original file name
    pub file_name: String,
    /// MIME type sent with the part
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    /// Read a local file, guessing its type from the extension
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let content_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        }
        .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// An image slot in a form: a stored URL or a new upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Already stored image or external URL
    Url(String),
    /// File to upload with the form
    Upload(PendingUpload),
}

fn split_images(images: &[ImageRef]) -> (Vec<String>, Vec<PendingUpload>) {
    let mut existing = Vec::new();
    let mut uploads = Vec::new();
    for image in images {
        match image {
            ImageRef::Url(url) if url.trim().is_empty() => {}
            ImageRef::Url(url) => existing.push(url.trim().to_string()),
            ImageRef::Upload(upload) => uploads.push(upload.clone()),
        }
    }
    (existing, uploads)
}

/// A validated menu item ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSubmission {
    /// Validated fields
    pub draft: MenuItemDraft,
    /// Stored images to keep
    pub existing_images: Vec<String>,
    /// New files to attach
    pub uploads: Vec<PendingUpload>,
}

/// A validated news item ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct NewsSubmission {
    /// Validated fields
    pub draft: NewsDraft,
    /// Stored images to keep
    pub existing_images: Vec<String>,
    /// New files to attach
    pub uploads: Vec<PendingUpload>,
}

/// Menu item form as typed by the admin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItemForm {
    /// Title input
    pub title: String,
    /// Price input
    pub price: String,
    /// Calories input, may be empty
    pub calories: String,
    description: String,
    /// Category input
    pub category: String,
    /// Image slots
    pub images: Vec<ImageRef>,
}

impl MenuItemForm {
    /// Prefill the form from a stored item
    #[must_use]
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            title: item.title.clone(),
            price: item.price.to_string(),
            calories: item.calories.map(|c| c.to_string()).unwrap_or_default(),
            description: item.description.clone().unwrap_or_default(),
            category: item.category.clone(),
            images: item.image_urls.iter().cloned().map(ImageRef::Url).collect(),
        }
    }

    /// Description input
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description, cut to the allowed length
    pub fn set_description(&mut self, value: &str) {
        self.description = truncate_chars(value, MAX_DESCRIPTION_CHARS);
    }

    /// Validate the inputs
    ///
    /// # Errors
    ///
    /// Returns one message per failing field.
    pub fn submission(&self) -> Result<MenuSubmission, FieldErrors> {
        // Whole roubles, cut the same way the server does
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(f64::trunc);
        let calories = self.calories.trim();
        let calories_parsed = calories.parse::<i32>().ok();

        let draft = MenuItemDraft {
            title: self.title.trim().to_string(),
            price: price.unwrap_or(0.0),
            calories: calories_parsed,
            description: non_empty(Some(self.description.as_str())),
            category: self.category.trim().to_string(),
        };

        let mut errors = check(&draft).err().unwrap_or_default();
        if price.is_none() {
            errors = replace_field(errors, "price", "Invalid price");
        }
        if !calories.is_empty() && calories_parsed.is_none() {
            errors.insert("calories", "Invalid calories");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let (existing_images, uploads) = split_images(&self.images);
        Ok(MenuSubmission {
            draft,
            existing_images,
            uploads,
        })
    }
}

/// News form as typed by the admin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsForm {
    /// Title input
    pub title: String,
    preview: String,
    description: String,
    /// Publication time, RFC 3339 or `YYYY-MM-DDTHH:MM` in UTC; blank means now
    pub posted_at: String,
    /// Image slots
    pub images: Vec<ImageRef>,
}

impl NewsForm {
    /// Prefill the form from a stored item
    #[must_use]
    pub fn from_item(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            preview: item.preview.clone().unwrap_or_default(),
            description: item.description.clone().unwrap_or_default(),
            posted_at: item.posted_at.to_rfc3339(),
            images: item.image_urls.iter().cloned().map(ImageRef::Url).collect(),
        }
    }

    /// Preview input
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Set the preview, cut to the allowed length
    pub fn set_preview(&mut self, value: &str) {
        self.preview = truncate_chars(value, MAX_PREVIEW_CHARS);
    }

    /// Description input
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description, cut to the allowed length
    pub fn set_description(&mut self, value: &str) {
        self.description = truncate_chars(value, MAX_DESCRIPTION_CHARS);
    }

    /// Validate the inputs
    ///
    /// # Errors
    ///
    /// Returns one message per failing field.
    pub fn submission(&self) -> Result<NewsSubmission, FieldErrors> {
        self.submission_at(Utc::now())
    }

    fn submission_at(&self, now: DateTime<Utc>) -> Result<NewsSubmission, FieldErrors> {
        let posted_at = if self.posted_at.trim().is_empty() {
            Some(now)
        } else {
            parse_posted_at(&self.posted_at)
        };
        let draft = NewsDraft {
            title: self.title.trim().to_string(),
            preview: non_empty(Some(self.preview.as_str())),
            description: non_empty(Some(self.description.as_str())),
            posted_at: posted_at.unwrap_or(now),
        };

        let mut errors = check(&draft).err().unwrap_or_default();
        if posted_at.is_none() {
            errors.insert("postedAt", "Invalid postedAt format");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let (existing_images, uploads) = split_images(&self.images);
        Ok(NewsSubmission {
            draft,
            existing_images,
            uploads,
        })
    }
}

fn parse_posted_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

fn replace_field(errors: FieldErrors, field: &str, message: &str) -> FieldErrors {
    let mut out = FieldErrors::default();
    out.insert(field, message);
    for (name, msg) in errors.iter() {
        out.insert(name, msg);
    }
    out
}
