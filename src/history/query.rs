//! Search, export, import, and statistics over the session store

use crate::error::{JosaiError, Result};
use crate::history::SessionStore;
use crate::storage::{Session, StorageStats};
use serde_json::{Map, Value};
use std::collections::HashSet;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

impl SessionStore {
    /// Sessions whose title or any message contains `query`, ignoring case
    ///
    /// Results keep the recency order of [`list_sessions`](Self::list_sessions).
    /// An empty query matches everything; callers that want "no filter"
    /// semantics should call `list_sessions` directly.
    pub fn search_sessions(&self, query: &str) -> Vec<Session> {
        let needle = query.to_lowercase();
        self.list_sessions()
            .into_iter()
            .filter(|session| {
                session.title.to_lowercase().contains(&needle)
                    || session
                        .messages
                        .iter()
                        .any(|m| m.text.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Pretty-printed JSON array of every session, most recent first
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the sessions cannot be encoded.
    pub fn export_history(&self) -> Result<String> {
        let sessions = self.list_sessions();
        Ok(serde_json::to_string_pretty(&sessions)?)
    }

    /// Replace the whole history with an exported document
    ///
    /// Returns `Ok(false)` without touching the store if `raw` fails
    /// [`validate_import`]. This is a destructive overwrite, not a merge.
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if the validated document cannot be
    /// saved.
    pub fn import_history(&self, raw: &str) -> Result<bool> {
        let sessions = match validate_import(raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected chat history import");
                return Ok(false);
            }
        };

        let count = sessions.len();
        self.replace_all(sessions)?;
        tracing::info!(sessions = count, "Imported chat history");
        Ok(true)
    }

    /// Session and message counts plus an estimate of the stored size
    ///
    /// `file_exists` reflects the file before this call; loading creates a
    /// missing file as a side effect.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the sessions cannot be encoded.
    pub fn storage_stats(&self) -> Result<StorageStats> {
        let file_exists = self.storage().exists();
        let sessions = self.list_sessions();
        let total_messages = sessions.iter().map(|s| s.messages.len()).sum();

        let compact = serde_json::to_string(&sessions)?;
        let approx_bytes = 2 * compact.encode_utf16().count() as u64;

        Ok(StorageStats {
            session_count: sessions.len(),
            total_messages,
            approx_bytes,
            storage_size: format_bytes(approx_bytes),
            file_path: self.storage().path().to_path_buf(),
            file_exists,
        })
    }
}

/// Check an import payload against the session schema
///
/// The root must be an array whose elements each carry a non-empty string
/// `id`, a non-empty string `title`, a `messages` array, and a numeric
/// `createdAt`; ids must be unique and every element must decode as a
/// [`Session`].
///
/// # Errors
///
/// Returns `JosaiError::ImportValidation` describing the first problem found.
pub fn validate_import(raw: &str) -> Result<Vec<Session>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| JosaiError::ImportValidation(format!("invalid JSON: {}", e)))?;

    let entries = value
        .as_array()
        .ok_or_else(|| JosaiError::ImportValidation("root is not an array".into()))?;

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let object = entry.as_object().ok_or_else(|| {
            JosaiError::ImportValidation(format!("entry {} is not an object", index))
        })?;

        let id = require_non_empty_str(object, "id", index)?;
        require_non_empty_str(object, "title", index)?;

        if !object.get("messages").map_or(false, Value::is_array) {
            return Err(JosaiError::ImportValidation(format!(
                "entry {} has no messages array",
                index
            ))
            .into());
        }

        if !object
            .get("createdAt")
            .map_or(false, Value::is_number)
        {
            return Err(JosaiError::ImportValidation(format!(
                "entry {} has no numeric createdAt",
                index
            ))
            .into());
        }

        if !seen.insert(id.to_string()) {
            return Err(
                JosaiError::ImportValidation(format!("duplicate session id {}", id)).into(),
            );
        }
    }

    let mut sessions: Vec<Session> = serde_json::from_value(value)
        .map_err(|e| JosaiError::ImportValidation(format!("unexpected session shape: {}", e)))?;

    for session in &mut sessions {
        session.normalize_timestamps();
    }

    Ok(sessions)
}

fn require_non_empty_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<&'a str> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(JosaiError::ImportValidation(format!(
            "entry {} has no {}",
            index, field
        ))
        .into()),
    }
}

/// Human-readable 1024-based size, e.g. `1.5 KB`
///
/// # Examples
///
/// ```
/// use josai::history::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", scaled);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}
