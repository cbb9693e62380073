//! Application state management

use crate::{auth::JwtService, cache::ResponseCache, images::ImageStore};
use cafe_core::{
    Config, context_error,
    context_error::{Result, ResultExt},
};
use cafe_database::PgPool;
use std::path::PathBuf;
use std::time::Duration;

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Database connection pool
    pub pool: PgPool,
    /// Directory uploaded images are stored in and served from
    pub upload_dir: PathBuf,
    /// Uploaded image storage
    pub images: ImageStore,
    /// Cached public menu payloads
    pub cache: ResponseCache,
    /// Admin token signer
    pub jwt: JwtService,
}

impl AppState {
    /// Create new application state
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub fn new(config: Config, pool: PgPool) -> Result<Self> {
        let upload_dir = config.storage.upload_dir.clone();
        std::fs::create_dir_all(&upload_dir).with_context(|| {
            format!("Failed to create upload directory {}", upload_dir.display())
        })?;

        let images = ImageStore::new(upload_dir.clone(), config.storage.max_image_size);
        let cache = ResponseCache::new(Duration::from_secs(config.api.cache_ttl_secs));
        let jwt = JwtService::new(
            &config.security.jwt_secret,
            config.security.token_ttl_hours,
        );

        Ok(Self {
            config,
            pool,
            upload_dir,
            images,
            cache,
            jwt,
        })
    }

    /// Check that the server can actually run with this state
    ///
    /// # Errors
    ///
    /// Returns an error if secrets are missing or the upload directory is not writable.
    pub fn validate(&self) -> Result<()> {
        self.config.validate_server()?;

        if !self.upload_dir.exists() {
            return Err(context_error!(
                "Upload directory does not exist: {}",
                self.upload_dir.display()
            ));
        }

        let test_file = self.upload_dir.join(".write_test");
        std::fs::write(&test_file, "test")?;
        std::fs::remove_file(&test_file)?;

        Ok(())
    }
}
