use crate::error::{JosaiError, Result};
use crate::history::title::{default_title, derive_title_from_message, is_default_title};
use crate::history::RetentionLimits;
use crate::storage::{now_millis, JsonFileStorage, Message, Session};
use ulid::Ulid;

/// Generate a new unique session or message identifier
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Session and message CRUD over the persisted document
///
/// Holds no session state of its own: each call loads the whole document,
/// mutates it, and saves it before returning. Callers track the "current"
/// session themselves and pass its id on every request.
///
/// # Examples
///
/// ```
/// use josai::history::SessionStore;
/// use josai::storage::JsonFileStorage;
///
/// # fn main() -> josai::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let store = SessionStore::new(JsonFileStorage::new_with_path(dir.path().join("h.json"))?);
///
/// let session = store.create_session(None)?;
/// store.add_message(&session.id, "How do lifetimes work?", true)?;
///
/// let loaded = store.get_session(&session.id).unwrap();
/// assert_eq!(loaded.title, "How do lifetimes work?");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: JsonFileStorage,
    limits: RetentionLimits,
}

impl SessionStore {
    /// Create a store with the default retention limits
    pub fn new(storage: JsonFileStorage) -> Self {
        Self::with_limits(storage, RetentionLimits::default())
    }

    /// Create a store with custom retention limits
    pub fn with_limits(storage: JsonFileStorage, limits: RetentionLimits) -> Self {
        Self { storage, limits }
    }

    /// Underlying storage backend
    pub fn storage(&self) -> &JsonFileStorage {
        &self.storage
    }

    /// Retention limits in effect
    pub fn limits(&self) -> RetentionLimits {
        self.limits
    }

    /// All sessions, most recently updated first
    ///
    /// Sessions with equal `last_updated_at` keep their stored order.
    pub fn list_sessions(&self) -> Vec<Session> {
        let mut sessions = self.storage.load();
        sort_by_recency(&mut sessions);
        sessions
    }

    /// Look up a session by id
    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.list_sessions().into_iter().find(|s| s.id == id)
    }

    /// The first `limit` sessions of [`list_sessions`](Self::list_sessions)
    pub fn recent_sessions(&self, limit: usize) -> Vec<Session> {
        let mut sessions = self.list_sessions();
        sessions.truncate(limit);
        sessions
    }

    /// Create and persist a new, empty session
    ///
    /// The session is placed first; if that pushes the count past the cap the
    /// least recently updated sessions are evicted.
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if the document cannot be saved.
    pub fn create_session(&self, title: Option<&str>) -> Result<Session> {
        let now = now_millis();
        let session = Session {
            id: new_id(),
            title: title
                .map(str::to_string)
                .unwrap_or_else(|| default_title(now)),
            messages: Vec::new(),
            created_at: now,
            last_updated_at: now,
        };

        let mut sessions = self.list_sessions();
        sessions.insert(0, session.clone());
        self.enforce_session_cap(&mut sessions);
        self.storage.save(&sessions)?;

        tracing::info!(session_id = %session.id, title = %session.title, "Created chat session");
        Ok(session)
    }

    /// Append a message to a session and persist it
    ///
    /// The first user message of a session that still carries its default
    /// title renames the session after the message's opening words. Messages
    /// beyond the per-session cap are trimmed from the oldest end.
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::SessionNotFound` if `session_id` is unknown and
    /// `JosaiError::StorageWrite` if the document cannot be saved.
    pub fn add_message(&self, session_id: &str, text: &str, is_user: bool) -> Result<Message> {
        let mut sessions = self.list_sessions();
        let index = sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| JosaiError::SessionNotFound(session_id.to_string()))?;

        let mut session = sessions.remove(index);
        let now = now_millis();
        let timestamp = session
            .messages
            .last()
            .map_or(now, |last| now.max(last.timestamp));

        let message = Message {
            id: new_id(),
            text: text.to_string(),
            is_user,
            timestamp,
            session_id: Some(session_id.to_string()),
        };
        session.messages.push(message.clone());

        if is_user && session.user_message_count() == 1 && is_default_title(&session.title) {
            if let Some(title) = derive_title_from_message(text) {
                tracing::debug!(session_id, title = %title, "Derived session title");
                session.title = title;
            }
        }

        session.last_updated_at = timestamp.max(session.created_at);
        trim_messages(&mut session, self.limits.max_messages_per_session);

        sessions.insert(0, session);
        self.storage.save(&sessions)?;

        tracing::debug!(session_id, message_id = %message.id, is_user, "Added message");
        Ok(message)
    }

    /// Rename a session; does nothing if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if the document cannot be saved.
    pub fn update_session_title(&self, session_id: &str, title: &str) -> Result<()> {
        let mut sessions = self.list_sessions();
        let Some(index) = sessions.iter().position(|s| s.id == session_id) else {
            tracing::debug!(session_id, "Rename ignored, session not found");
            return Ok(());
        };

        let mut session = sessions.remove(index);
        session.title = title.to_string();
        session.last_updated_at = now_millis().max(session.last_updated_at);
        sessions.insert(0, session);

        self.storage.save(&sessions)
    }

    /// Delete a session; deleting an unknown id is not an error
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if the document cannot be saved.
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.list_sessions();
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);

        if sessions.len() < before {
            tracing::info!(session_id, "Deleted chat session");
        }

        self.storage.save(&sessions)
    }

    /// Remove every session
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if the document cannot be saved.
    pub fn clear_all(&self) -> Result<()> {
        self.storage.save(&[])?;
        tracing::info!("Cleared all chat history");
        Ok(())
    }

    /// Replace the whole document, applying the retention caps first
    pub(crate) fn replace_all(&self, mut sessions: Vec<Session>) -> Result<()> {
        sort_by_recency(&mut sessions);
        self.enforce_session_cap(&mut sessions);
        for session in &mut sessions {
            trim_messages(session, self.limits.max_messages_per_session);
        }
        self.storage.save(&sessions)
    }

    fn enforce_session_cap(&self, sessions: &mut Vec<Session>) {
        let max = self.limits.max_sessions;
        if sessions.len() > max {
            let evicted = sessions.len() - max;
            sessions.truncate(max);
            tracing::info!(evicted, max, "Evicted least recently updated sessions");
        }
    }
}

/// Stable sort, most recently updated first
pub(crate) fn sort_by_recency(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.last_updated_at.cmp(&a.last_updated_at));
}

fn trim_messages(session: &mut Session, max: usize) {
    let len = session.messages.len();
    if len > max {
        session.messages.drain(..len - max);
    }
}
