//! Core error types for slotwise-core.
//!
//! Validation failures happen at construction time only. The scheduling pass
//! itself never fails: a task that does not fit is reported as unscheduled.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for slotwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Errors raised by task sources, busy sources and assignment sinks
    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Interval whose end precedes its start
    #[error("Invalid interval: end ({end}) is before start ({start})")]
    InvalidInterval {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Task that cannot enter ranking
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors from the collaborators around the core.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with an error payload
    #[error("{service} API error: {message}")]
    Api { service: String, message: String },

    /// The source explicitly has nothing to offer (not installed, not running, no access)
    #[error("{source_name} unavailable: {message}")]
    Unavailable { source_name: String, message: String },

    /// A response or record could not be interpreted
    #[error("Malformed data from {source_name}: {message}")]
    Parse { source_name: String, message: String },

    /// Local file or process I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable credentials
    #[error("Credentials for {service} not available: {message}")]
    Credentials { service: String, message: String },
}

impl IntegrationError {
    /// Whether the caller may treat this as "zero items".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IntegrationError::Unavailable { .. })
    }
}

impl From<url::ParseError> for IntegrationError {
    fn from(err: url::ParseError) -> Self {
        IntegrationError::Parse {
            source_name: "url".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
