//! Gemini provider implementation for Jos AI
//!
//! Calls the `generateContent` endpoint of the Google Generative Language API
//! with the session's earlier turns as context.

use crate::config::GeminiConfig;
use crate::error::{JosaiError, Result};
use crate::providers::{ApiError, ApiErrorKind, Provider};
use crate::storage::Message;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use josai::config::GeminiConfig;
/// use josai::providers::{GeminiProvider, Provider};
///
/// # async fn example() -> josai::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("AIza...".to_string()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config)?;
/// let reply = provider.get_response("What does `?` do in Rust?", &[]).await;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::MissingCredentials` if no API key is configured and
    /// `JosaiError::Provider` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| JosaiError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| JosaiError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, prompt: &str, context: &[Message]) -> GenerateRequest {
        let mut contents: Vec<Content> = context
            .iter()
            .map(|m| Content {
                role: Some(if m.is_user { "user" } else { "model" }.to_string()),
                parts: vec![Part {
                    text: m.text.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: chat_prompt(prompt),
            }],
        });

        GenerateRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// Wrap the user's message in the assistant persona prompt
fn chat_prompt(message: &str) -> String {
    format!(
        "You are a helpful AI assistant specializing in programming and code-related questions.\n\n\
         User question: {}\n\n\
         Please provide a helpful, conversational response. If it's about code, explain it clearly. \
         If it's a general question, answer it in a friendly, informative way.",
        message
    )
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn get_response(
        &self,
        prompt: &str,
        context: &[Message],
    ) -> std::result::Result<String, ApiError> {
        let request = self.build_request(prompt, context);
        tracing::debug!(
            model = %self.config.model,
            turns = request.contents.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                ApiError::new(ApiErrorKind::Network, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(ApiError::new(
                ApiErrorKind::from_status(status.as_u16()),
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ApiError::new(ApiErrorKind::Other, format!("invalid response body: {}", e))
        })?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::new(ApiErrorKind::Other, "response contained no text"))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
