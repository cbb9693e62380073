//! Utility functions for category keys and uploaded image paths

use std::path::Path;

/// URL prefix under which uploaded images are served
pub const UPLOADS_PREFIX: &str = "/uploads/";

fn cyrillic(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Derive a category key from its Russian display name
///
/// Cyrillic letters map to Latin, ASCII letters, digits and spaces are kept,
/// everything else becomes `_`. Spaces become `_` and the result is lowercase.
#[must_use]
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        if let Some(latin) = cyrillic(lower) {
            out.push_str(latin);
        } else if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }
    out
}

/// Generate a unique stored filename, keeping the original extension
#[must_use]
pub fn generate_upload_filename(original: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    match Path::new(original).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{uuid}.{ext}"),
        _ => uuid.to_string(),
    }
}

/// Public path for a stored upload
#[must_use]
pub fn upload_url(filename: &str) -> String {
    format!("{UPLOADS_PREFIX}{filename}")
}

/// Whether an image reference points into the local upload directory
#[must_use]
pub fn is_uploaded_path(url: &str) -> bool {
    url.contains(UPLOADS_PREFIX)
}

/// Stored filename behind an upload reference
///
/// Returns `None` for external URLs and for anything that would escape the
/// upload directory.
#[must_use]
pub fn upload_file_name(url: &str) -> Option<&str> {
    let (_, name) = url.rsplit_once(UPLOADS_PREFIX)?;
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "." {
        return None;
    }
    Some(name)
}

/// Whether a multipart part's content type is an image
#[must_use]
pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}
