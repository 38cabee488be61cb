//! Provider module for Jos AI
//!
//! This module contains the model-response provider abstraction and the
//! Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{ApiError, ApiErrorKind, Provider};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::{JosaiError, Result};

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns an error if the provider type is unknown or the provider cannot be
/// initialized (for example, a missing API key).
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::new(config.gemini.clone())?)),
        other => Err(JosaiError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}
