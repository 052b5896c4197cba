//! Configuration management for the Jikan tools.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Jikan API client settings
    #[serde(default)]
    pub jikan: JikanConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Jikan API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Per-request timeout in seconds (0 disables it)
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Client-side throttling
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Throttle outgoing requests
    pub enabled: bool,

    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Log directory path; file output is disabled when unset
    pub log_dir: Option<String>,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: jikan::api::client::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: jikan::api::client::DEFAULT_TIMEOUT.as_secs(),
            user_agent: jikan::api::client::DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let limit = jikan::RateLimit::default();
        Self {
            enabled: true,
            requests_per_second: limit.requests_per_second,
            requests_per_minute: limit.requests_per_minute,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: "warn".to_string(),
            log_dir: None,
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the log directory, if file logging is configured
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging.log_dir.as_ref().map(PathBuf::from)
    }

    /// Client settings for [`jikan::JikanClient::with_config`]
    pub fn client_config(&self) -> jikan::ClientConfig {
        let jikan = &self.jikan;
        jikan::ClientConfig {
            base_url: jikan.base_url.clone(),
            timeout: (jikan.timeout_seconds > 0).then(|| Duration::from_secs(jikan.timeout_seconds)),
            user_agent: jikan.user_agent.clone(),
            headers: jikan
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            rate_limit: jikan.rate_limit.enabled.then(|| jikan::RateLimit {
                requests_per_second: jikan.rate_limit.requests_per_second,
                requests_per_minute: jikan.rate_limit.requests_per_minute,
            }),
            transport: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.jikan.timeout_seconds, 30);
        assert_eq!(config.jikan.rate_limit.requests_per_second, 3.0);
        assert!(config.jikan.rate_limit.enabled);
        assert_eq!(config.log_dir(), None);
    }

    #[test]
    fn test_example_config_matches_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, include_str!("../../../config.example.toml"))?;

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config, Config::default());

        Ok(())
    }

    #[test]
    fn test_log_dir() {
        let mut config = Config::default();
        config.logging.log_dir = Some("logs".to_string());
        assert_eq!(config.log_dir(), Some(PathBuf::from("logs")));
    }

    #[test]
    fn test_partial_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
                [jikan]
                base_url = "http://localhost:8080/v4"
                timeout_seconds = 0

                [jikan.rate_limit]
                enabled = false
            "#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.jikan.base_url, "http://localhost:8080/v4");
        assert_eq!(config.jikan.user_agent, jikan::api::client::DEFAULT_USER_AGENT);
        assert_eq!(config.logging, LoggingConfig::default());

        let client_config = config.client_config();
        assert_eq!(client_config.timeout, None);
        assert_eq!(client_config.rate_limit, None);

        Ok(())
    }

    #[test]
    fn test_invalid_config_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[jikan]\ntimeout_seconds = \"soon\"\n")?;

        assert!(Config::from_file(&config_path).is_err());
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_client_config_mapping() {
        let mut config = Config::default();
        config.jikan.timeout_seconds = 5;
        config
            .jikan
            .headers
            .insert("X-Client".to_string(), "tests".to_string());

        let client_config = config.client_config();
        assert_eq!(client_config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            client_config.headers,
            vec![("X-Client".to_string(), "tests".to_string())]
        );
        assert_eq!(client_config.rate_limit, Some(jikan::RateLimit::default()));
        assert!(jikan::JikanClient::with_config(client_config).is_ok());
    }
}
