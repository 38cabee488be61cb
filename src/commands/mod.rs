/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`    — Send one message and print the reply
- `bridge`  — Serve the presentation protocol on stdin/stdout
- `history` — Inspect and manage stored sessions
*/

use crate::config::Config;
use crate::error::{JosaiError, Result};
use crate::history::{SessionStore, SharedSessionStore};
use crate::providers::{create_provider, ApiError, ApiErrorKind, Provider};
use crate::storage::{JsonFileStorage, Message};
use async_trait::async_trait;

// History management commands
pub mod history;

/// Open the session store described by `config`
///
/// An explicit `storage.path` wins; otherwise the history file is resolved
/// from the workspace (or the per-user data directory).
///
/// # Errors
///
/// Returns `JosaiError::Storage` if the storage location cannot be prepared.
pub fn open_store(config: &Config) -> Result<SessionStore> {
    let storage = match &config.storage.path {
        Some(path) => JsonFileStorage::new_with_path(path.clone())?,
        None => JsonFileStorage::new(config.storage.workspace.as_deref())?,
    };
    tracing::debug!(path = %storage.path().display(), "Using chat history file");
    Ok(SessionStore::with_limits(storage, config.storage.limits))
}

/// Stand-in used when no API key is configured
///
/// Lets history commands work through the bridge while every chat message
/// gets the invalid-key fallback reply.
struct UnconfiguredProvider;

#[async_trait]
impl Provider for UnconfiguredProvider {
    async fn get_response(
        &self,
        _prompt: &str,
        _context: &[Message],
    ) -> std::result::Result<String, ApiError> {
        Err(ApiError::new(
            ApiErrorKind::InvalidKey,
            "no API key configured",
        ))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

fn provider_or_unconfigured(config: &Config) -> Result<Box<dyn Provider>> {
    match create_provider(&config.provider) {
        Ok(provider) => Ok(provider),
        Err(e) if matches!(e.downcast_ref::<JosaiError>(), Some(JosaiError::MissingCredentials(_))) => {
            tracing::warn!(
                "No API key configured; set JOSAI_GEMINI_API_KEY to enable chat replies"
            );
            Ok(Box::new(UnconfiguredProvider))
        }
        Err(e) => Err(e),
    }
}

// Chat command handler
pub mod chat {
    //! One-shot chat handler.
    //!
    //! Sends a single message through [`ChatService`](crate::chat::ChatService)
    //! and prints the stored reply.

    use super::*;
    use crate::chat::ChatService;
    use colored::Colorize;

    /// Send `message` (optionally continuing `session`) and print the reply
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created (missing API key)
    /// or the history cannot be saved.
    pub async fn run_chat(config: Config, session: Option<String>, message: String) -> Result<()> {
        let provider = create_provider(&config.provider)?;
        let store = SharedSessionStore::new(open_store(&config)?);
        let service = ChatService::new(store, provider);

        let turn = service.send(session.as_deref(), &message).await?;

        println!("{}", turn.reply.text);
        println!();
        if turn.created_session {
            println!("{} {}", "Started session".green(), turn.session_id.cyan());
        }
        println!(
            "Use {} to continue this conversation.",
            format!("josai chat --session {} <MESSAGE>", turn.session_id).cyan()
        );
        Ok(())
    }
}

// Bridge command handler
pub mod bridge {
    //! Presentation-protocol server.

    use super::*;
    use crate::bridge::Bridge;
    use crate::chat::ChatService;

    /// Serve JSON-line commands on stdin until it closes
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or stdio fails.
    pub async fn run_bridge(config: Config) -> Result<()> {
        let provider = provider_or_unconfigured(&config)?;
        let store = SharedSessionStore::new(open_store(&config)?);
        let bridge = Bridge::new(ChatService::new(store, provider), config.chat.recent_limit);

        tracing::info!("Bridge ready, reading commands from stdin");
        bridge.run_stdio().await?;
        tracing::info!("Bridge input closed");
        Ok(())
    }
}
