//! # Application Configuration
//!
//! Where the backend lives, where the local storage file goes, and how
//! amounts are shown.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPFRONT_API_URL=https://api.shop.vn/api                          │
//! │     SHOPFRONT_API_TIMEOUT=15                                           │
//! │     SHOPFRONT_DB_PATH=/tmp/shopfront.db                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopfront/shopfront.toml (Linux)                         │
//! │     ~/Library/Application Support/vn.shopfront.shopfront/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080/api, 30 s timeout, platform data dir         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:8080/api"
//! timeout_secs = 30
//!
//! [storage]
//! database_path = "/path/to/shopfront.db"
//!
//! [store]
//! currency_symbol = "₫"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shopfront_client::ApiConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "shopfront.toml";

/// Database file name inside the platform data directory.
pub const DB_FILE_NAME: &str = "shopfront.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    shopfront_client::config::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    shopfront_client::config::DEFAULT_TIMEOUT.as_secs()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file holding the guest cart. Platform data dir when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "₫".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shopfront.toml)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the default path may be absent.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if explicit || path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SHOPFRONT_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = var("SHOPFRONT_API_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(timeout = %timeout, "Ignoring non-numeric SHOPFRONT_API_TIMEOUT"),
            }
        }

        if let Some(path) = var("SHOPFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Backend client settings.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.base_url.clone()).timeout(Duration::from_secs(self.api.timeout_secs))
    }

    /// The configured database path, or `shopfront.db` in the platform data dir.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .ok_or_else(|| ConfigError::Invalid("Could not determine app data directory".into()))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("vn", "shopfront", "shopfront")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.store.currency_symbol, "₫");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.shop.vn/api"

            [storage]
            database_path = "/tmp/cart.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.shop.vn/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/cart.db"));
        assert_eq!(config.store, StoreSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHOPFRONT_API_URL", "https://staging.shop.vn/api/"),
            ("SHOPFRONT_API_TIMEOUT", "5"),
            ("SHOPFRONT_DB_PATH", "/data/shopfront.db"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/data/shopfront.db"))
        );
        let api = config.api_config();
        assert_eq!(api.base_url, "https://staging.shop.vn/api");
        assert_eq!(api.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| {
            (name == "SHOPFRONT_API_TIMEOUT").then(|| "soon".to_string())
        });
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.api.base_url = "localhost:8080".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.api.base_url = "http://localhost:8080/api".to_string();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(PathBuf::from("/nonexistent/shopfront.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
