//! Configuration module for Knowhub
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`KNOWHUB_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use knowhub::config::KnowhubConfig;
//!
//! let config = KnowhubConfig::default();
//! assert_eq!(config.debug.max_entries, 100);
//!
//! let toml = r#"
//! [api]
//! base_url = "https://kb.example.com/api"
//! "#;
//! let config: KnowhubConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.base_url, "https://kb.example.com/api");
//! ```

pub mod api;
pub mod debug;
pub mod error;
pub mod logging;

pub use api::{ApiConfig, CallerKind};
pub use debug::{DebugConfig, DEFAULT_MAX_ENTRIES};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KnowhubConfig {
    /// Backend connection settings
    pub api: ApiConfig,
    /// Debug call-log settings
    pub debug: DebugConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl KnowhubConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports KNOWHUB_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("KNOWHUB_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(caller) = std::env::var("KNOWHUB_CALLER") {
            if let Ok(c) = caller.parse() {
                self.api.caller = c;
            }
        }
        if let Ok(client_id) = std::env::var("KNOWHUB_CLIENT_ID") {
            self.api.client_id = Some(client_id);
        }

        if let Ok(level) = std::env::var("KNOWHUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KNOWHUB_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(debug) = std::env::var("KNOWHUB_DEBUG") {
            self.debug.enabled = debug.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::validation(
                "api.base_url",
                "URL cannot be empty",
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::validation(
                "api.base_url",
                "URL must start with http:// or https://",
            ));
        }

        if self.api.caller == CallerKind::Agent
            && self.api.client_id.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::validation(
                "api.client_id",
                "agent callers must set a client id",
            ));
        }

        if self.debug.max_entries == 0 {
            return Err(ConfigError::validation(
                "debug.max_entries",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}
