//! Jos AI - editor assistant chat history library
//!
//! This library provides the core functionality behind the Jos AI assistant:
//! durable chat-session storage, model-response providers, and the command
//! protocol spoken with the editor panel.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: On-disk JSON history document and its location
//! - `history`: Session store with retention caps, search, import/export
//! - `providers`: Model-response provider abstraction and the Gemini client
//! - `chat`: Chat turns with error-kind fallback replies
//! - `bridge`: JSON command/event protocol for the presentation layer
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use josai::history::SessionStore;
//! use josai::storage::JsonFileStorage;
//!
//! fn main() -> anyhow::Result<()> {
//!     let storage = JsonFileStorage::new(Some(std::path::Path::new(".")))?;
//!     let store = SessionStore::new(storage);
//!     let session = store.create_session(None)?;
//!     store.add_message(&session.id, "How do lifetimes work?", true)?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use bridge::{Bridge, UiCommand, UiEvent};
pub use chat::{ChatService, ChatTurn};
pub use config::Config;
pub use error::{JosaiError, Result};
pub use history::{SessionStore, SharedSessionStore};
pub use storage::{JsonFileStorage, Message, Session, StorageStats};

#[cfg(test)]
pub mod test_utils;
