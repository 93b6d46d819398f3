//! Service configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration for local use.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::KEY_SIZES;
use crate::datastore::{StoreConfig, MEMORY_SCHEME};
use crate::http_server::HttpServerConfig;
use crate::tokenizer::DEFAULT_COLLECTION;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "CONFIG_INVALID",
        }
    }
}

/// Document datastore settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Hard cap on records per page (default: 100)
    #[serde(default = "default_max_records")]
    pub max_records: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_uri() -> String {
    MEMORY_SCHEME.to_string()
}

fn default_database() -> String {
    "tarpon".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_max_records() -> u64 {
    100
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            max_records: default_max_records(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatastoreConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            uri: self.uri.clone(),
            database: self.database.clone(),
            max_records: self.max_records,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub datastore: DatastoreConfig,

    /// "production" switches logs to JSON
    #[serde(default = "default_api_mode")]
    pub api_mode: String,

    /// Page size used when a list request gives no limit
    #[serde(default = "default_page_record_count")]
    pub page_record_count: i64,

    /// Key for at-rest value encryption; empty disables it
    #[serde(default)]
    pub encryption_key: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_mode() -> String {
    "development".to_string()
}

fn default_page_record_count() -> i64 {
    25
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            datastore: DatastoreConfig::default(),
            api_mode: default_api_mode(),
            page_record_count: default_page_record_count(),
            encryption_key: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.datastore.max_records == 0 {
            return Err(ConfigError::invalid("datastore.max_records must be > 0"));
        }
        if self.datastore.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid("datastore.connect_timeout_secs must be > 0"));
        }
        if self.datastore.database.trim().is_empty() {
            return Err(ConfigError::invalid("datastore.database must not be empty"));
        }
        if self.datastore.collection.trim().is_empty() {
            return Err(ConfigError::invalid("datastore.collection must not be empty"));
        }
        if self.page_record_count <= 0 {
            return Err(ConfigError::invalid("page_record_count must be > 0"));
        }
        if let Some(key) = self.encryption_key() {
            if !KEY_SIZES.contains(&key.len()) {
                return Err(ConfigError::invalid(format!(
                    "encryption_key must be 16 or 32 bytes, got {}",
                    key.len()
                )));
            }
        }
        if self.http.port == 0 {
            return Err(ConfigError::invalid("http.port must be > 0"));
        }
        Ok(())
    }

    /// Encryption key bytes, if one is configured
    pub fn encryption_key(&self) -> Option<&[u8]> {
        if self.encryption_key.is_empty() {
            None
        } else {
            Some(self.encryption_key.as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.datastore.max_records, 100);
        assert_eq!(config.datastore.collection, "community");
        assert_eq!(config.api_mode, "development");
        assert!(config.encryption_key().is_none());
    }

    #[test]
    fn test_nested_overrides() {
        let file = write_config(
            r#"{
                "http": {"port": 8080},
                "datastore": {"max_records": 50, "connect_timeout_secs": 5},
                "api_mode": "production",
                "encryption_key": "0123456789abcdef"
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");

        let store = config.datastore.store_config();
        assert_eq!(store.max_records, 50);
        assert_eq!(store.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.encryption_key().map(<[u8]>::len), Some(16));
    }

    #[test]
    fn test_rejects_zero_max_records() {
        let file = write_config(r#"{"datastore": {"max_records": 0}}"#);
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_key_length() {
        let file = write_config(r#"{"encryption_key": "too-short"}"#);
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{not json");
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_PARSE_FAILED");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/tarpon.json")).unwrap_err();
        assert_eq!(err.code(), "CONFIG_READ_FAILED");
    }
}
