//! Base provider trait and error types for Jos AI
//!
//! A provider turns a prompt (plus prior messages of the session) into reply
//! text. Failures carry an [`ApiErrorKind`] so the caller can store a fixed,
//! human-readable fallback reply instead of losing the turn.

use crate::storage::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a failed model request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The API key was rejected or the request was malformed (400/401)
    InvalidKey,
    /// Too many requests (429)
    RateLimited,
    /// The key lacks permission for the model (403)
    Forbidden,
    /// The request never produced an HTTP response
    Network,
    /// Anything else, including responses without reply text
    Other,
}

impl ApiErrorKind {
    /// Classify an HTTP status code returned by the model API
    ///
    /// # Examples
    ///
    /// ```
    /// use josai::providers::ApiErrorKind;
    ///
    /// assert_eq!(ApiErrorKind::from_status(429), ApiErrorKind::RateLimited);
    /// assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Other);
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 401 => Self::InvalidKey,
            403 => Self::Forbidden,
            429 => Self::RateLimited,
            _ => Self::Other,
        }
    }

    /// Reply stored in place of the model's answer when a request fails
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::InvalidKey => {
                "Invalid Gemini API key or request. Please check your API key."
            }
            Self::RateLimited => "Gemini API rate limit exceeded. Please try again later.",
            Self::Forbidden => {
                "Gemini API access denied. Please check your API key permissions."
            }
            Self::Network => {
                "An error occurred while processing your message. Please try again."
            }
            Self::Other => "Sorry, I couldn't process your request. Please try again.",
        }
    }
}

/// A failed model request
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Fallback reply for this error's kind
    pub fn fallback_message(&self) -> &'static str {
        self.kind.fallback_message()
    }
}

/// Model-response provider
///
/// Implementations do not retry; the caller decides what to store on failure.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Produce a reply to `prompt`
    ///
    /// # Arguments
    ///
    /// * `prompt` - The user's new message
    /// * `context` - Earlier messages of the same session, oldest first
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying why no reply was produced.
    async fn get_response(
        &self,
        prompt: &str,
        context: &[Message],
    ) -> std::result::Result<String, ApiError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}
