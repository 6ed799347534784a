//! Relay configuration.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default raw-content origin.
pub const DEFAULT_ORIGIN: &str = "https://raw.githubusercontent.com";

/// Relay configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Origin configuration.
    #[serde(default)]
    pub origin: OriginConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Load config from a file. Paths ending in `.json` are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Check values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.origin.base_url)
            .with_context(|| format!("Invalid origin base_url: {}", self.origin.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("origin base_url must be http or https, got {}", url.scheme());
        }
        if self.origin.timeout_ms == 0 {
            bail!("origin timeout_ms must be greater than zero");
        }
        if self.origin.connect_timeout_ms > self.origin.timeout_ms {
            bail!("origin connect_timeout_ms must not exceed timeout_ms");
        }
        if self.cache.key_prefix.is_empty() {
            bail!("cache key_prefix must not be empty");
        }
        Ok(())
    }
}

/// Origin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Base URL the coordinate and file path are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// User agent sent to the origin.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl OriginConfig {
    /// Total fetch timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_user_agent() -> String {
    format!("raw-relay/{}", env!("CARGO_PKG_VERSION"))
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key-value store label.
    #[serde(default = "default_store")]
    pub store: String,

    /// Prefix for every cache key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_store() -> String {
    "default".to_string()
}

fn default_key_prefix() -> String {
    "relay".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: json or human.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RelayConfig::default();
        assert_eq!(config.origin.base_url, DEFAULT_ORIGIN);
        assert_eq!(config.origin.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.store, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = RelayConfig::from_toml(
            r#"
            [origin]
            base_url = "http://127.0.0.1:9000"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.origin.timeout_ms, 10_000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.cache.key_prefix, "relay");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = RelayConfig::default();
        config.origin.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = RelayConfig::default();
        config.origin.timeout_ms = 0;
        config.origin.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_connect_over_total() {
        let mut config = RelayConfig::default();
        config.origin.connect_timeout_ms = config.origin.timeout_ms + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        let path = path.to_str().unwrap();

        let mut config = RelayConfig::default();
        config.cache.store = "relay-cache".to_string();
        config.save(path).unwrap();

        assert_eq!(RelayConfig::load(path).unwrap(), config);
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        std::fs::write(&path, r#"{"origin": {"timeout_ms": 2500}}"#).unwrap();

        let config = RelayConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.origin.timeout_ms, 2500);
        assert_eq!(config.origin.base_url, DEFAULT_ORIGIN);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RelayConfig::load("/nonexistent/relay.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
