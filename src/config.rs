//! Configuration management for Voxdash
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, VoxdashError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Voxdash
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dashboard HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Push notification channel settings
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Local key-value store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dashboard HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_seconds: default_api_timeout(),
        }
    }
}

/// Push notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// WebSocket origin; the listener connects to `{ws_base_url}/api/ws/{user_id}`
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,

    /// Fixed delay before every reconnect attempt (milliseconds)
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

fn default_ws_base_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_reconnect_delay() -> u64 {
    3000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
            reconnect_delay_ms: default_reconnect_delay(),
        }
    }
}

/// Local store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Also append log output to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "voxdash=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VoxdashError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| VoxdashError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("VOXDASH_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("VOXDASH_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid VOXDASH_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(ws_base_url) = std::env::var("VOXDASH_WS_BASE_URL") {
            self.notifications.ws_base_url = ws_base_url;
        }

        if let Ok(store_path) = std::env::var("VOXDASH_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(store_path));
        }

        if let Ok(level) = std::env::var("VOXDASH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var("VOXDASH_LOG_JSON") {
            if let Ok(value) = json.parse() {
                self.logging.json_format = value;
            } else {
                tracing::warn!("Invalid VOXDASH_LOG_JSON: {}", json);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(store) = &cli.store {
            self.storage.path = Some(store.clone());
        }

        if cli.verbose {
            self.logging.level = "voxdash=debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Config` if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let api_url = url::Url::parse(&self.api.base_url).map_err(|e| {
            VoxdashError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(VoxdashError::Config(format!(
                "api.base_url must use http or https, got: {}",
                api_url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(VoxdashError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let ws_url = url::Url::parse(&self.notifications.ws_base_url).map_err(|e| {
            VoxdashError::Config(format!(
                "Invalid notifications.ws_base_url '{}': {}",
                self.notifications.ws_base_url, e
            ))
        })?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(VoxdashError::Config(format!(
                "notifications.ws_base_url must use ws or wss, got: {}",
                ws_url.scheme()
            ))
            .into());
        }

        if self.notifications.reconnect_delay_ms == 0 {
            return Err(VoxdashError::Config(
                "notifications.reconnect_delay_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.logging.level.trim().is_empty() {
            return Err(VoxdashError::Config("logging.level cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
