//! Resolving image references to displayable sources

use crate::forms::ImageRef;

/// Source to render for an image reference
///
/// Absolute and `data:` URLs pass through, server paths are joined onto
/// `base_url`, and pending uploads have no source yet.
#[must_use]
pub fn resolve_image_src(image: &ImageRef, base_url: &str) -> Option<String> {
    match image {
        ImageRef::Url(url) => resolve_url(url, base_url),
        ImageRef::Upload(_) => None,
    }
}

/// Resolve a stored image URL
#[must_use]
pub fn resolve_url(url: &str, base_url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
        return Some(url.to_string());
    }

    let base = base_url.trim_end_matches('/');
    if url.starts_with('/') {
        Some(format!("{base}{url}"))
    } else {
        Some(format!("{base}/{url}"))
    }
}

/// Resolve every stored URL, skipping empty ones
#[must_use]
pub fn resolve_all(urls: &[String], base_url: &str) -> Vec<String> {
    urls.iter()
        .filter_map(|url| resolve_url(url, base_url))
        .collect()
}
