//! Storage of uploaded menu and news images

use cafe_core::{Error, Result, utils};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An image part received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-side file name
    pub file_name: Option<String>,
    /// Declared content type
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Writes uploads into the served `/uploads/` directory and removes them again
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_size: u64,
}

impl ImageStore {
    /// Create a store rooted at `dir`
    #[must_use]
    pub const fn new(dir: PathBuf, max_size: u64) -> Self {
        Self { dir, max_size }
    }

    /// Directory holding the stored files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reject anything that is not an image or exceeds the size limit
    ///
    /// # Errors
    ///
    /// Returns an upload error naming the offending type or size.
    pub fn check(&self, image: &UploadedImage) -> Result<()> {
        if !utils::is_image_content_type(image.content_type.as_deref()) {
            return Err(Error::Upload(format!(
                "invalid file type: {}",
                image.content_type.as_deref().unwrap_or("unknown")
            )));
        }
        let size = image.bytes.len() as u64;
        if size > self.max_size {
            return Err(Error::Upload(format!("file too large: {size} bytes")));
        }
        Ok(())
    }

    /// Validate every image, then write them all, returning their public paths
    ///
    /// Nothing is left on disk when any write fails.
    ///
    /// # Errors
    ///
    /// Returns an upload error for a rejected image or an I/O error.
    pub async fn save_all(&self, images: &[UploadedImage]) -> Result<Vec<String>> {
        for image in images {
            self.check(image)?;
        }
        if images.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let mut saved = Vec::with_capacity(images.len());
        for image in images {
            let name =
                utils::generate_upload_filename(image.file_name.as_deref().unwrap_or_default());
            let path = self.dir.join(&name);
            if let Err(e) = tokio::fs::write(&path, &image.bytes).await {
                warn!("Failed to write upload {}: {}", path.display(), e);
                self.remove(&saved).await?;
                return Err(Error::Io(e));
            }
            debug!("Stored upload {} ({} bytes)", name, image.bytes.len());
            saved.push(utils::upload_url(&name));
        }
        Ok(saved)
    }

    /// Delete the files behind uploaded references; external URLs are ignored
    ///
    /// # Errors
    ///
    /// Returns an I/O error other than a missing file.
    pub async fn remove(&self, urls: &[String]) -> Result<()> {
        for url in urls.iter().filter(|url| utils::is_uploaded_path(url)) {
            let Some(name) = utils::upload_file_name(url) else {
                continue;
            };
            match tokio::fs::remove_file(self.dir.join(name)).await {
                Ok(()) => debug!("Removed upload {}", name),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }
}

/// References present in `old` but missing from `new`
#[must_use]
pub fn unreferenced(old: &[String], new: &[String]) -> Vec<String> {
    old.iter()
        .filter(|url| !new.contains(url))
        .cloned()
        .collect()
}
