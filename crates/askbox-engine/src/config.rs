//! Configuration types for the askbox engine.
//!
//! This module defines the configuration schema: where replies come from,
//! how long to wait for them, and the fixed texts the widget shows.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::session::WidgetStrings;

/// Path of the ask endpoint, relative to the base URL.
pub const ASK_PATH: &str = "/ask";

/// Main configuration for askbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat backend (scheme, host, port).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds. Zero waits forever.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Escape HTML in bot replies before rendering.
    #[serde(default)]
    pub escape_html: bool,

    /// Greeting, typing indicator and fallback texts.
    #[serde(default)]
    pub strings: WidgetStrings,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_request_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Full URL of the ask endpoint.
    pub fn ask_url(&self) -> String {
        format!("{}{ASK_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            escape_html: false,
            strings: WidgetStrings::default(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
