//! Shared support for the Jikan command-line tools.
//!
//! This crate provides:
//! - Configuration management (TOML file with defaults)
//! - Logging infrastructure

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::LogConfig;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
