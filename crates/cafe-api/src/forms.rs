//! Multipart admin form parsing

use crate::handlers::{ApiError, ApiResult, api_error, validation_error};
use crate::images::UploadedImage;
use axum::{extract::Multipart, http::StatusCode};
use cafe_core::{
    FieldErrors, MenuItemDraft, NewsDraft,
    types::{check, non_empty},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Raw contents of a multipart form
#[derive(Debug, Default)]
pub struct FormFields {
    text: HashMap<String, String>,
    images: Vec<UploadedImage>,
}

impl FormFields {
    /// Add a text field; a repeated name keeps the first value
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.text.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Add an `images` file part
    pub fn push_image(&mut self, image: UploadedImage) {
        self.images.push(image);
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    fn existing_images(&self) -> ApiResult<Vec<String>> {
        match self.text("existingImages").map(str::trim) {
            None | Some("") => Ok(Vec::new()),
            Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|e| {
                warn!("Invalid existingImages: {}", e);
                api_error(StatusCode::BAD_REQUEST, "INVALID_FORM", "Invalid existingImages")
            }),
        }
    }
}

/// Read every part of a multipart body
///
/// # Errors
///
/// Returns 400 when the body is not valid multipart data.
pub async fn read_multipart(mut multipart: Multipart) -> ApiResult<FormFields> {
    let mut fields = FormFields::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(&e)),
        };
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(String::from);
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
            if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            fields.push_image(UploadedImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(|e| multipart_error(&e))?;
            fields.push_text(name, value);
        }
    }

    Ok(fields)
}

fn multipart_error(e: &axum::extract::multipart::MultipartError) -> ApiError {
    warn!("Failed to parse multipart form: {}", e);
    api_error(
        StatusCode::BAD_REQUEST,
        "INVALID_FORM",
        format!("Failed to parse multipart form: {}", e.body_text()),
    )
}

/// A validated menu item form
#[derive(Debug)]
pub struct MenuForm {
    /// Submitted fields, price already cut to whole roubles
    pub draft: MenuItemDraft,
    /// Previously stored images to keep
    pub existing_images: Vec<String>,
    /// Newly attached images
    pub images: Vec<UploadedImage>,
}

impl MenuForm {
    /// Whole-rouble price of the validated draft
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn price(&self) -> i32 {
        self.draft.price as i32
    }
}

impl TryFrom<FormFields> for MenuForm {
    type Error = ApiError;

    fn try_from(fields: FormFields) -> ApiResult<Self> {
        let price = match fields.text("price").map(str::trim) {
            Some(raw) => raw.parse::<f64>().ok().filter(|p| p.is_finite()),
            None => None,
        };
        let Some(price) = price else {
            let mut errors = FieldErrors::default();
            errors.insert("price", "Invalid price");
            return Err(validation_error(&errors));
        };

        let draft = MenuItemDraft {
            title: fields.text("title").unwrap_or_default().trim().to_string(),
            price: price.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)),
            calories: fields
                .text("calories")
                .and_then(|raw| raw.trim().parse::<i32>().ok()),
            description: non_empty(fields.text("description")),
            category: fields.text("category").unwrap_or_default().trim().to_string(),
        };
        check(&draft).map_err(|errors| validation_error(&errors))?;

        let existing_images = fields.existing_images()?;
        Ok(Self {
            draft,
            existing_images,
            images: fields.images,
        })
    }
}

/// A validated news form
#[derive(Debug)]
pub struct NewsForm {
    /// Submitted fields
    pub draft: NewsDraft,
    /// Previously stored images to keep
    pub existing_images: Vec<String>,
    /// Newly attached images
    pub images: Vec<UploadedImage>,
}

impl TryFrom<FormFields> for NewsForm {
    type Error = ApiError;

    fn try_from(fields: FormFields) -> ApiResult<Self> {
        let posted_at = fields
            .text("postedAt")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let Some(posted_at) = posted_at else {
            let mut errors = FieldErrors::default();
            errors.insert("postedAt", "Invalid postedAt format");
            return Err(validation_error(&errors));
        };

        let draft = NewsDraft {
            title: fields.text("title").unwrap_or_default().trim().to_string(),
            preview: non_empty(fields.text("preview")),
            description: non_empty(fields.text("description")),
            posted_at,
        };
        check(&draft).map_err(|errors| validation_error(&errors))?;

        let existing_images = fields.existing_images()?;
        Ok(Self {
            draft,
            existing_images,
            images: fields.images,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::Json;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn menu_fields(price: &str) -> FormFields {
        let mut fields = FormFields::default();
        fields.push_text("title", " Cappuccino ");
        fields.push_text("price", price);
        fields.push_text("calories", "abc");
        fields.push_text("description", "");
        fields.push_text("category", "Напитки");
        fields
    }

    #[test]
    fn test_menu_form_truncates_price() {
        let form = MenuForm::try_from(menu_fields("249.99")).unwrap();
        assert_eq!(form.price(), 249);
        assert_eq!(form.draft.title, "Cappuccino");
        assert_eq!(form.draft.calories, None);
        assert_eq!(form.draft.description, None);
        assert!(form.existing_images.is_empty());
    }

    #[test]
    fn test_menu_form_rejects_fractional_price_below_one() {
        let (status, Json(body)) = MenuForm::try_from(menu_fields("0.5")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.details,
            Some(json!({ "fields": { "price": "Price must be greater than 0" } }))
        );
    }

    #[test]
    fn test_menu_form_rejects_unparseable_price() {
        let (_, Json(body)) = MenuForm::try_from(menu_fields("free")).unwrap_err();
        assert_eq!(
            body.details,
            Some(json!({ "fields": { "price": "Invalid price" } }))
        );
    }

    #[test]
    fn test_menu_form_reads_existing_images() {
        let mut fields = menu_fields("100");
        fields.push_text("existingImages", r#"["/uploads/a.png","https://cdn/x.jpg"]"#);
        let form = MenuForm::try_from(fields).unwrap();
        assert_eq!(form.existing_images, vec!["/uploads/a.png", "https://cdn/x.jpg"]);

        let mut bad = menu_fields("100");
        bad.push_text("existingImages", "not json");
        let (status, Json(body)) = MenuForm::try_from(bad).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid existingImages");
    }

    #[test]
    fn test_news_form() {
        let mut fields = FormFields::default();
        fields.push_text("title", "Jazz night");
        fields.push_text("preview", "Friday at 8");
        fields.push_text("postedAt", "2025-06-01T18:00:00+03:00");
        let form = NewsForm::try_from(fields).unwrap();
        assert_eq!(form.draft.posted_at.to_rfc3339(), "2025-06-01T15:00:00+00:00");
        assert_eq!(form.draft.preview.as_deref(), Some("Friday at 8"));
    }

    #[test]
    fn test_news_form_requires_valid_posted_at() {
        let mut fields = FormFields::default();
        fields.push_text("title", "Jazz night");
        fields.push_text("postedAt", "tomorrow");
        let (_, Json(body)) = NewsForm::try_from(fields).unwrap_err();
        assert_eq!(
            body.details,
            Some(json!({ "fields": { "postedAt": "Invalid postedAt format" } }))
        );
    }

    #[test]
    fn test_news_form_preview_limit() {
        let mut fields = FormFields::default();
        fields.push_text("title", "Jazz night");
        fields.push_text("preview", "p".repeat(51));
        fields.push_text("postedAt", "2025-06-01T18:00:00Z");
        let (_, Json(body)) = NewsForm::try_from(fields).unwrap_err();
        assert_eq!(
            body.details,
            Some(json!({ "fields": { "preview": "Preview too long" } }))
        );
    }
}
