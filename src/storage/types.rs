use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Read a millisecond timestamp written as any JSON number
///
/// Hand-edited or foreign exports sometimes store `1700000000000.0`; those
/// are rounded to whole milliseconds.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Int(ms) => Ok(ms),
        Millis::Float(ms) if ms.is_finite() => Ok(ms.round() as i64),
        Millis::Float(ms) => Err(serde::de::Error::custom(format!(
            "invalid millisecond timestamp {}",
            ms
        ))),
    }
}

/// One turn in a chat session
///
/// Messages are immutable once appended; the only way to remove one is to
/// delete its session or let the per-session cap trim it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier (ULID)
    pub id: String,
    /// Prompt or response text; may be empty
    pub text: String,
    /// True if authored by the human, false for the assistant
    pub is_user: bool,
    /// Milliseconds since the Unix epoch, set at append time
    #[serde(deserialize_with = "deserialize_millis")]
    pub timestamp: i64,
    /// Informational back-reference to the owning session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A conversation thread and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier (ULID)
    pub id: String,
    /// User-friendly title
    pub title: String,
    /// Messages in append order, oldest first
    pub messages: Vec<Message>,
    /// When the session was created (ms)
    #[serde(deserialize_with = "deserialize_millis")]
    pub created_at: i64,
    /// When the session was last mutated (ms)
    ///
    /// Imported documents may omit this field; it is filled from
    /// `created_at` after deserialization.
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub last_updated_at: i64,
}

impl Session {
    /// Number of messages authored by the user
    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user).count()
    }

    /// Restore `last_updated_at >= created_at` after deserialization
    pub(crate) fn normalize_timestamps(&mut self) {
        if self.last_updated_at < self.created_at {
            self.last_updated_at = self.created_at;
        }
    }
}

/// Storage statistics for display in the history view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub session_count: usize,
    pub total_messages: usize,
    /// Estimated size in bytes (two bytes per UTF-16 code unit)
    pub approx_bytes: u64,
    /// `approx_bytes` formatted as Bytes/KB/MB/GB
    pub storage_size: String,
    pub file_path: PathBuf,
    pub file_exists: bool,
}
