//! Error types for Jos AI
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Jos AI operations
///
/// Store operations return `anyhow::Result`; callers that need to react to a
/// specific failure (for example a missing session) recover the variant with
/// `anyhow::Error::downcast_ref::<JosaiError>()`.
#[derive(Error, Debug)]
pub enum JosaiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, response decoding)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Storage location could not be resolved or prepared
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted document could not be read or parsed
    ///
    /// Never returned from `load`; it is logged and recovered locally.
    #[error("Failed to read chat history: {0}")]
    StorageRead(String),

    /// Persisting the document failed (disk full, permission denied, ...)
    #[error("Failed to save chat history: {0}")]
    StorageWrite(String),

    /// Operation referenced a session id that is not in the store
    #[error("Session {0} not found")]
    SessionNotFound(String),

    /// Import payload failed schema validation
    #[error("Invalid history import: {0}")]
    ImportValidation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl JosaiError {
    /// Returns true if `err` wraps a [`JosaiError::SessionNotFound`]
    pub fn is_session_not_found(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<JosaiError>(),
            Some(JosaiError::SessionNotFound(_))
        )
    }

    /// Returns true if `err` wraps a [`JosaiError::StorageWrite`]
    pub fn is_storage_write(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<JosaiError>(),
            Some(JosaiError::StorageWrite(_))
        )
    }
}

/// Result type alias for Jos AI operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
