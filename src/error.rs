//! Error types for SchoolTracker
//!
//! Most of the core degrades instead of failing (stale snapshot, cache miss),
//! so this enum mostly covers configuration, persistence and the detail
//! lookups that do surface errors.

use thiserror::Error;

/// Result type alias for SchoolTracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote API errors
    #[error("API error: {0}")]
    Api(#[from] tracker_api::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
