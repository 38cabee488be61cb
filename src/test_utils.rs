//! Test utilities for Jos AI
//!
//! This module provides common test utilities including temporary history
//! stores, canned sessions, and assertion helpers.

use crate::config::Config;
use crate::history::SessionStore;
use crate::storage::{JsonFileStorage, Message, Session};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Path of a history file inside `dir`
pub fn history_path(dir: &TempDir) -> PathBuf {
    dir.path().join("jos-ai-chat-history.json")
}

/// Create a session store backed by a file in a fresh temporary directory
///
/// The directory must outlive the store, so both are returned.
pub fn temp_store() -> (SessionStore, TempDir) {
    let dir = temp_dir();
    let storage =
        JsonFileStorage::new_with_path(history_path(&dir)).expect("Failed to create storage");
    (SessionStore::new(storage), dir)
}

/// Build a session with `message_count` alternating user/assistant messages
///
/// Timestamps start at `created_at` and advance by one millisecond per
/// message; `last_updated_at` is the last message's timestamp.
pub fn sample_session(id: &str, title: &str, created_at: i64, message_count: usize) -> Session {
    let messages: Vec<Message> = (0..message_count)
        .map(|i| Message {
            id: format!("{}-m{}", id, i),
            text: format!("message {}", i),
            is_user: i % 2 == 0,
            timestamp: created_at + i as i64,
            session_id: Some(id.to_string()),
        })
        .collect();
    let last_updated_at = messages.last().map_or(created_at, |m| m.timestamp);

    Session {
        id: id.to_string(),
        title: title.to_string(),
        messages,
        created_at,
        last_updated_at,
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration whose history lives in `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(history_path(dir));
    config.provider.gemini.api_key = Some("test-key".to_string());
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
provider:
  type: gemini
  gemini:
    model: gemini-1.5-flash-latest
    api_base: http://localhost:9/v1beta
    timeout_seconds: 5

storage:
  limits:
    max_sessions: 5
    max_messages_per_session: 10

chat:
  recent_limit: 3
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JosaiError;

    #[test]
    fn test_temp_store_starts_empty() {
        let (store, dir) = temp_store();
        assert!(store.list_sessions().is_empty());
        assert!(history_path(&dir).exists());
    }

    #[test]
    fn test_sample_session_shape() {
        let session = sample_session("s1", "Sample", 1_000, 3);
        assert_eq!(session.messages.len(), 3);
        assert!(session.messages[0].is_user);
        assert!(!session.messages[1].is_user);
        assert_eq!(session.last_updated_at, 1_002);
        assert_eq!(session.user_message_count(), 2);
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(JosaiError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: crate::error::Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert_eq!(config.storage.path, Some(history_path(&dir)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.storage.limits.max_sessions, 5);
        assert_eq!(config.chat.recent_limit, 3);
        assert!(config.validate().is_ok());
    }
}
