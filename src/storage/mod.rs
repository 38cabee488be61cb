use crate::error::{Result, JosaiError};
use chrono::Utc;
use directories::ProjectDirs;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{Message, Session, StorageStats};

/// File name shared by the workspace-local and application-global locations
pub const HISTORY_FILE_NAME: &str = "jos-ai-chat-history.json";

/// Directory created under a workspace root to hold the history file
pub const WORKSPACE_DIR_NAME: &str = ".josai";

/// Environment variable that overrides the resolved history file path
pub const HISTORY_FILE_ENV: &str = "JOSAI_HISTORY_FILE";

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Resolve where the history document lives
///
/// Resolution order: the `JOSAI_HISTORY_FILE` override, then
/// `<workspace>/.josai/jos-ai-chat-history.json` when a workspace root is
/// known, then the per-user application data directory.
///
/// # Errors
///
/// Returns `JosaiError::Storage` if no application data directory can be
/// determined for the current user.
pub fn resolve_storage_path(workspace: Option<&Path>) -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var(HISTORY_FILE_ENV) {
        if !override_path.trim().is_empty() {
            return Ok(PathBuf::from(override_path));
        }
    }

    if let Some(root) = workspace {
        return Ok(root.join(WORKSPACE_DIR_NAME).join(HISTORY_FILE_NAME));
    }

    let proj_dirs = ProjectDirs::from("com", "josai", "josai")
        .ok_or_else(|| JosaiError::Storage("Could not determine data directory".into()))?;

    Ok(proj_dirs.data_dir().join(HISTORY_FILE_NAME))
}

/// Path of the backup written when `path` fails to parse
pub fn backup_path_for(path: &Path, epoch_ms: i64) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".backup.{}", epoch_ms));
    PathBuf::from(name)
}

/// Durable storage of the whole session document as one JSON array
///
/// Every call reads or writes the complete document. There is no in-memory
/// cache, so two instances pointed at the same file always observe each
/// other's completed writes.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage instance at the resolved default location
    ///
    /// # Arguments
    ///
    /// * `workspace` - Optional workspace root used for a workspace-local file
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or its parent
    /// directory cannot be created.
    pub fn new(workspace: Option<&Path>) -> Result<Self> {
        let path = resolve_storage_path(workspace)?;
        Self::new_with_path(path)
    }

    /// Create a storage instance that uses the specified file path.
    ///
    /// The parent directory is created if missing; the file itself is created
    /// lazily by the first `load` or `save`.
    ///
    /// # Examples
    ///
    /// ```
    /// use josai::storage::JsonFileStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = JsonFileStorage::new_with_path(dir.path().join("history.json")).unwrap();
    /// assert!(storage.load().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    JosaiError::Storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tracing::debug!(path = %path.display(), "Using chat history file");
        Ok(Self { path })
    }

    /// Location of the history document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the history document currently exists on disk
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every stored session
    ///
    /// Never fails. A missing file is created empty; an empty file yields no
    /// sessions; a corrupt file (including one that is not UTF-8) is copied to
    /// `<path>.backup.<epoch-ms>`, reset to an empty array, and yields no
    /// sessions. If the backup cannot be written the file is left untouched.
    pub fn load(&self) -> Vec<Session> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Err(e) = self.write_document("[]") {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to create empty history file"
                    );
                }
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read history file, continuing with empty history"
                );
                return Vec::new();
            }
        };

        let parsed = String::from_utf8(bytes)
            .map_err(|e| JosaiError::StorageRead(format!("not valid UTF-8: {}", e)))
            .and_then(|raw| {
                if raw.trim().is_empty() {
                    Ok(Vec::new())
                } else {
                    parse_document(&raw)
                }
            });

        match parsed {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "History file is corrupt");
                self.recover_corrupted(now_millis());
                Vec::new()
            }
        }
    }

    /// Overwrite the document with `sessions`
    ///
    /// # Errors
    ///
    /// Returns `JosaiError::StorageWrite` if serialization or any file
    /// operation fails. The previous document is left intact in that case.
    pub fn save(&self, sessions: &[Session]) -> Result<()> {
        let json = serde_json::to_string_pretty(sessions)
            .map_err(|e| JosaiError::StorageWrite(format!("failed to serialize sessions: {}", e)))?;

        self.write_document(&json).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to save chat history");
            JosaiError::StorageWrite(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::trace!(sessions = sessions.len(), "Saved chat history");
        Ok(())
    }

    /// Back up an unparsable document and reset it to an empty array
    ///
    /// The reset only happens once the backup exists; otherwise the corrupt
    /// document stays in place.
    fn recover_corrupted(&self, epoch_ms: i64) -> Option<PathBuf> {
        let backup = backup_path_for(&self.path, epoch_ms);
        if let Err(e) = fs::copy(&self.path, &backup) {
            tracing::error!(
                backup = %backup.display(),
                error = %e,
                "Failed to back up corrupt history file, leaving it in place"
            );
            return None;
        }
        tracing::warn!(backup = %backup.display(), "Backed up corrupt history file");

        if let Err(e) = self.write_document("[]") {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to reset history file");
        }

        Some(backup)
    }

    /// Write `contents` to a sibling temp file, then rename it into place
    fn write_document(&self, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = OsString::from(self.path.as_os_str());
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, contents)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}

/// Parse the raw document, rejecting anything that is not an array of sessions
fn parse_document(raw: &str) -> std::result::Result<Vec<Session>, JosaiError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| JosaiError::StorageRead(format!("invalid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(JosaiError::StorageRead("root is not an array".into()));
    }

    let mut sessions: Vec<Session> = serde_json::from_value(value)
        .map_err(|e| JosaiError::StorageRead(format!("unexpected session shape: {}", e)))?;

    for session in &mut sessions {
        session.normalize_timestamps();
    }

    Ok(sessions)
}
