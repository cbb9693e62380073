//! Configuration management for the cafe website

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Image storage configuration
    pub storage: StorageConfig,

    /// Admin authentication configuration
    pub security: SecurityConfig,

    /// API configuration
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Admin client configuration
    pub client: ClientConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,

    /// Maximum number of connections
    pub max_connections: u32,

    /// Minimum number of connections
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle timeout in seconds
    pub idle_timeout: u64,
}

/// Storage configuration for uploaded images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploaded images are written to and served from
    pub upload_dir: PathBuf,

    /// Maximum size of a single image in bytes
    pub max_image_size: u64,

    /// Maximum size of a whole multipart form in bytes
    pub max_form_size: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// The single admin password accepted by `/api/login`
    pub admin_password: String,

    /// HMAC secret used to sign admin tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Enable CORS
    pub enable_cors: bool,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// Lifetime of cached menu and category payloads in seconds
    pub cache_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log format (json or pretty)
    pub format: String,
}

/// Admin client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API, without the `/api` suffix
    pub api_base_url: String,

    /// File holding the persisted token and cached list snapshots
    pub storage_path: PathBuf,

    /// Seconds before a notification is dismissed automatically
    pub notification_ttl_secs: i64,
}

// Default value functions
fn env_or(keys: &[&str], fallback: &str) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}

const fn default_max_image_size() -> u64 {
    5 * 1024 * 1024
}

const fn default_max_form_size() -> u64 {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: env_or(&["PORT"], "8080").parse().unwrap_or(8080),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env_or(
                &["CAFE_DATABASE_URL", "POSTGRES_DSN", "DATABASE_URL"],
                "postgresql://localhost/cafe",
            ),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            idle_timeout: 600,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            max_image_size: default_max_image_size(),
            max_form_size: default_max_form_size(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_password: env_or(&["ADMIN_PASSWORD"], ""),
            jwt_secret: env_or(&["JWT_SECRET"], ""),
            token_ttl_hours: 7 * 24,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            cache_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            storage_path: PathBuf::from("./.cafe-admin.json"),
            notification_ttl_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from an optional `config` file and `CAFE__*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading the given file instead of the default `config` lookup
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load_from(path: Option<&std::path::Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("CAFE").separator("__"))
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })
    }

    /// Check the settings the API server cannot run without
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing setting.
    pub fn validate_server(&self) -> crate::Result<()> {
        if self.security.jwt_secret.is_empty() {
            return Err(crate::Error::Configuration {
                message: "security.jwt_secret (JWT_SECRET) must be set".to_string(),
            });
        }
        if self.security.admin_password.is_empty() {
            return Err(crate::Error::Configuration {
                message: "security.admin_password (ADMIN_PASSWORD) must be set".to_string(),
            });
        }
        if self.security.token_ttl_hours <= 0 {
            return Err(crate::Error::Configuration {
                message: "security.token_ttl_hours must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Full `host:port` the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::field_reassign_with_default)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.port > 0);

        assert!(config.database.url.contains("postgres"));
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 1);

        assert_eq!(config.storage.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.storage.max_image_size, 5 * 1024 * 1024);
        assert_eq!(config.storage.max_form_size, 32 * 1024 * 1024);

        assert_eq!(config.security.token_ttl_hours, 168);

        assert!(config.api.enable_cors);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.api.cache_ttl_secs, 604_800);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");

        assert_eq!(config.client.api_base_url, "http://localhost:8080");
        assert_eq!(config.client.notification_ttl_secs, 5);
    }

    #[test]
    fn test_validate_server_requires_secrets() {
        let mut config = Config::default();
        config.security.jwt_secret = String::new();
        config.security.admin_password = "pw".to_string();
        let err = config.validate_server().unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));

        config.security.jwt_secret = "secret".to_string();
        config.security.admin_password = String::new();
        let err = config.validate_server().unwrap_err();
        assert!(err.to_string().contains("admin_password"));

        config.security.admin_password = "pw".to_string();
        assert!(config.validate_server().is_ok());

        config.security.token_ttl_hours = 0;
        assert!(config.validate_server().is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[security]\nadmin_password = \"pw\"\njwt_secret = \"s\"\n\n[client]\napi_base_url = \"http://cafe.test\""
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.admin_password, "pw");
        assert_eq!(config.client.api_base_url, "http://cafe.test");
        assert_eq!(config.storage.max_image_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Some(std::path::Path::new("/nonexistent/cafe.toml")));
        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.server.port, config.server.port);
        assert_eq!(deserialized.storage.upload_dir, config.storage.upload_dir);
        assert_eq!(deserialized.client.storage_path, config.client.storage_path);
    }

    #[test]
    fn test_partial_json_uses_section_defaults() {
        let config: Config = serde_json::from_str(r#"{"server": {"port": 1234}}"#).unwrap();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
    }
}
