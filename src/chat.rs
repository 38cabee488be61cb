//! Chat turn handling
//!
//! Stores the user's message, asks the provider for a reply, and stores the
//! reply (or a fallback for the failure kind) in the same session. The caller
//! owns the notion of a "current" session and passes its id in; a missing or
//! unknown id starts a new session so the user's message is never dropped.

use crate::error::Result;
use crate::history::SharedSessionStore;
use crate::providers::Provider;
use crate::storage::Message;
use serde::Serialize;

/// Outcome of one chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    /// Session the turn was stored in
    pub session_id: String,
    /// Whether the session was created for this turn
    pub created_session: bool,
    /// Stored user message
    pub user_message: Message,
    /// Stored assistant reply (model text or fallback)
    pub reply: Message,
}

/// Runs chat turns against a provider and the shared store
pub struct ChatService<P: Provider + ?Sized> {
    store: SharedSessionStore,
    provider: Box<P>,
}

impl<P: Provider + ?Sized> ChatService<P> {
    pub fn new(store: SharedSessionStore, provider: Box<P>) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &SharedSessionStore {
        &self.store
    }

    /// Send `text` in `session_id` (or a new session) and store the reply
    ///
    /// # Errors
    ///
    /// Returns a storage error if either message cannot be persisted.
    /// Provider failures are not errors; they produce a fallback reply.
    pub async fn send(&self, session_id: Option<&str>, text: &str) -> Result<ChatTurn> {
        let requested = session_id.map(str::to_string);
        let owned_text = text.to_string();
        let (session_id, created_session, context, user_message) = self
            .store
            .with_store(move |store| -> Result<_> {
                let existing = requested.as_deref().and_then(|id| store.get_session(id));
                if existing.is_none() {
                    if let Some(id) = requested.as_deref() {
                        tracing::warn!(session_id = id, "Session not found, starting a new one");
                    }
                }

                let (session, created) = match existing {
                    Some(session) => (session, false),
                    None => (store.create_session(None)?, true),
                };

                let user_message = store.add_message(&session.id, &owned_text, true)?;
                Ok((session.id, created, session.messages, user_message))
            })
            .await?;

        let reply_text = match self.provider.get_response(text, &context).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Model request failed, storing fallback reply"
                );
                e.fallback_message().to_string()
            }
        };

        let reply = match self.store.add_message(&session_id, &reply_text, false).await {
            Ok(reply) => reply,
            Err(e) if crate::error::JosaiError::is_session_not_found(&e) => {
                // Deleted while the model was answering; keep the reply in a fresh session
                tracing::warn!(session_id = %session_id, "Session vanished before reply was stored");
                let session = self.store.create_session(None).await?;
                self.store.add_message(&session.id, &reply_text, false).await?
            }
            Err(e) => return Err(e),
        };

        Ok(ChatTurn {
            session_id: reply.session_id.clone().unwrap_or(session_id),
            created_session,
            user_message,
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SessionStore;
    use crate::providers::{ApiError, ApiErrorKind};
    use crate::storage::JsonFileStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Provider that replays canned results and records the context it saw
    struct ScriptedProvider {
        results: Mutex<Vec<std::result::Result<String, ApiError>>>,
        seen_context: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn new(results: Vec<std::result::Result<String, ApiError>>) -> Self {
            Self {
                results: Mutex::new(results),
                seen_context: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn get_response(
            &self,
            _prompt: &str,
            context: &[Message],
        ) -> std::result::Result<String, ApiError> {
            self.seen_context.lock().unwrap().push(context.len());
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Ok("Done".to_string())
            } else {
                results.remove(0)
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn create_service(
        results: Vec<std::result::Result<String, ApiError>>,
    ) -> (ChatService<ScriptedProvider>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new_with_path(dir.path().join("history.json")).unwrap();
        let store = SharedSessionStore::new(SessionStore::new(storage));
        (
            ChatService::new(store, Box::new(ScriptedProvider::new(results))),
            dir,
        )
    }

    #[tokio::test]
    async fn test_send_without_session_creates_one() {
        let (service, _dir) = create_service(vec![Ok("Hi!".to_string())]);

        let turn = service.send(None, "Explain borrowing to me").await.unwrap();
        assert!(turn.created_session);
        assert_eq!(turn.reply.text, "Hi!");
        assert!(!turn.reply.is_user);

        let session = service.store().get_session(&turn.session_id).await.unwrap();
        assert_eq!(session.title, "Explain borrowing to me");
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages[0].is_user);
    }

    #[tokio::test]
    async fn test_send_continues_existing_session_with_context() {
        let (service, _dir) = create_service(vec![]);

        let first = service.send(None, "one").await.unwrap();
        let second = service.send(Some(&first.session_id), "two").await.unwrap();

        assert!(!second.created_session);
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(*service.provider.seen_context.lock().unwrap(), vec![0, 2]);

        let session = service.store().get_session(&first.session_id).await.unwrap();
        assert_eq!(session.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_send_unknown_session_falls_back_to_new() {
        let (service, _dir) = create_service(vec![]);

        let turn = service.send(Some("missing"), "hello").await.unwrap();
        assert!(turn.created_session);
        assert_ne!(turn.session_id, "missing");
        assert_eq!(service.store().list_sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_stores_fallback() {
        let (service, _dir) = create_service(vec![Err(ApiError::new(
            ApiErrorKind::RateLimited,
            "429",
        ))]);

        let turn = service.send(None, "hello").await.unwrap();
        assert_eq!(
            turn.reply.text,
            ApiErrorKind::RateLimited.fallback_message()
        );

        let session = service.store().get_session(&turn.session_id).await.unwrap();
        assert_eq!(session.messages[1].text, turn.reply.text);
    }
}
