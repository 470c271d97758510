//! Application configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration:
//!
//! ```json
//! {
//!   "http": { "host": "127.0.0.1", "port": 3000 },
//!   "resources_dir": "./resources",
//!   "log_filter": "info"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::http::HttpConfig;

/// Configuration load / validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Directory holding one sub-directory per resource
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,

    /// `tracing` filter directive; `RUST_LOG` overrides it
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from("./resources")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            resources_dir: default_resources_dir(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Invalid("http.host must not be empty".to_string()));
        }

        if self.resources_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("resources_dir must not be empty".to_string()));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            ConfigError::Invalid(format!("log_filter '{}': {}", self.log_filter, e))
        })?;

        Ok(())
    }
}
