//! Error types for Voxdash
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Voxdash operations
///
/// Covers configuration, persisted state, the dashboard HTTP API and the
/// push notification channel. Corrupt session state is deliberately absent:
/// the session state machine heals it in place instead of reporting it.
#[derive(Error, Debug)]
pub enum VoxdashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value store errors (open, read, write, flush)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The request was sent but no response arrived (DNS, refused, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-success status
    #[error("API error: status={status}, {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Authentication errors (missing token, failed refresh, 401)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Push channel errors (bad URL, missing user)
    #[error("Notification error: {0}")]
    Notification(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket protocol errors
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl VoxdashError {
    /// Returns the HTTP status carried by an [`VoxdashError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Voxdash operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// [`VoxdashError`] stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
