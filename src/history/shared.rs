//! Single-flight access to a [`SessionStore`]
//!
//! Each store call is a load, mutate, save cycle. Two cycles that overlap can
//! lose an update, so concurrent hosts go through `SharedSessionStore`, which
//! queues callers on a fair (FIFO) `tokio::sync::Mutex` and runs one cycle to
//! completion before starting the next.

use crate::error::Result;
use crate::history::SessionStore;
use crate::storage::{Message, Session, StorageStats};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle that serializes store operations in arrival order
#[derive(Debug, Clone)]
pub struct SharedSessionStore {
    inner: Arc<Mutex<SessionStore>>,
}

impl SharedSessionStore {
    /// Wrap a store for shared, serialized use
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run several store calls as one uninterrupted step
    ///
    /// No other queued operation runs between the calls made inside `f`.
    /// The store does blocking file I/O, so `f` runs on the blocking pool
    /// while this task holds the lock.
    pub async fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionStore) -> R + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.inner).lock_owned().await;
        match tokio::task::spawn_blocking(move || f(&store)).await {
            Ok(value) => value,
            // Blocking tasks are only cancelled at runtime shutdown
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => panic!("history store task did not complete: {}", e),
        }
    }

    pub async fn list_sessions(&self) -> Vec<Session> {
        self.with_store(|s| s.list_sessions()).await
    }

    pub async fn get_session(&self, id: &str) -> Option<Session> {
        let id = id.to_string();
        self.with_store(move |s| s.get_session(&id)).await
    }

    pub async fn recent_sessions(&self, limit: usize) -> Vec<Session> {
        self.with_store(move |s| s.recent_sessions(limit)).await
    }

    pub async fn create_session(&self, title: Option<&str>) -> Result<Session> {
        let title = title.map(str::to_string);
        self.with_store(move |s| s.create_session(title.as_deref()))
            .await
    }

    pub async fn add_message(&self, session_id: &str, text: &str, is_user: bool) -> Result<Message> {
        let (session_id, text) = (session_id.to_string(), text.to_string());
        self.with_store(move |s| s.add_message(&session_id, &text, is_user))
            .await
    }

    pub async fn update_session_title(&self, session_id: &str, title: &str) -> Result<()> {
        let (session_id, title) = (session_id.to_string(), title.to_string());
        self.with_store(move |s| s.update_session_title(&session_id, &title))
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.with_store(move |s| s.delete_session(&session_id)).await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.with_store(|s| s.clear_all()).await
    }

    pub async fn search_sessions(&self, query: &str) -> Vec<Session> {
        let query = query.to_string();
        self.with_store(move |s| s.search_sessions(&query)).await
    }

    pub async fn export_history(&self) -> Result<String> {
        self.with_store(|s| s.export_history()).await
    }

    pub async fn import_history(&self, raw: &str) -> Result<bool> {
        let raw = raw.to_string();
        self.with_store(move |s| s.import_history(&raw)).await
    }

    pub async fn storage_stats(&self) -> Result<StorageStats> {
        self.with_store(|s| s.storage_stats()).await
    }
}
