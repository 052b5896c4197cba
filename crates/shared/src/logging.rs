//! Logging infrastructure for the Jikan tools.
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! File output is optional and rotates daily.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path; no file output when unset
    pub log_dir: Option<PathBuf>,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            component: "jikan".to_string(),
            default_level: Level::WARN,
            console: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` section of a [`crate::Config`].
    ///
    /// `verbose` forces debug level regardless of the configured one.
    pub fn from_settings(config: &crate::Config, component: &str, verbose: bool) -> Result<Self> {
        let settings = &config.logging;
        let default_level = if verbose {
            Level::DEBUG
        } else {
            settings
                .default_level
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid log level: {}", settings.default_level))?
        };

        Ok(Self {
            log_dir: config.log_dir(),
            component: component.to_string(),
            default_level,
            console: true,
            json_format: settings.json_format,
        })
    }
}

/// Filter directives used when `RUST_LOG` is not set.
fn default_directives(level: Level) -> String {
    format!(
        "jikan={level},jikan_cli={level},shared={level},hyper=warn,reqwest=warn,h2=warn",
        level = level.as_str().to_ascii_lowercase()
    )
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Module-specific log levels, overridable via `RUST_LOG`
/// - Human-readable console output on stderr
/// - Optional daily-rotated file output, plain or JSON
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.default_level)));

    let mut layers = Vec::new();

    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = ?config.log_dir,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LoggingConfig};

    #[test]
    fn test_logging_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "jikan");
        assert_eq!(config.default_level, Level::WARN);
        assert!(config.console);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_from_settings() -> Result<()> {
        let settings = Config {
            logging: LoggingConfig {
                default_level: "info".to_string(),
                log_dir: Some("logs".to_string()),
                json_format: true,
            },
            ..Default::default()
        };

        let config = LogConfig::from_settings(&settings, "jikan-cli", false)?;
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.log_dir, Some(PathBuf::from("logs")));
        assert!(config.json_format);

        let verbose = LogConfig::from_settings(&settings, "jikan-cli", true)?;
        assert_eq!(verbose.default_level, Level::DEBUG);

        let console_only = LogConfig::from_settings(&Config::default(), "jikan-cli", false)?;
        assert_eq!(console_only.log_dir, None);
        assert_eq!(console_only.default_level, Level::WARN);
        Ok(())
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let settings = Config {
            logging: LoggingConfig {
                default_level: "chatty".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(LogConfig::from_settings(&settings, "jikan-cli", false).is_err());
    }

    #[test]
    fn test_default_directives_parse() {
        let directives = default_directives(Level::INFO);
        assert!(directives.starts_with("jikan=info,"));
        assert!(directives.contains("shared=info,"));
        assert!(EnvFilter::try_new(directives).is_ok());

        assert!(default_directives(Level::WARN).starts_with("jikan=warn,"));
    }
}
