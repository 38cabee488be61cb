//! Chat session history
//!
//! `SessionStore` performs every operation as a full load, mutate, save cycle
//! against [`JsonFileStorage`](crate::storage::JsonFileStorage), enforcing the
//! retention caps on each mutation. `SharedSessionStore` serializes those
//! cycles for hosts that issue commands concurrently.

pub mod query;
pub mod shared;
pub mod store;
pub mod title;

pub use query::format_bytes;
pub use shared::SharedSessionStore;
pub use store::SessionStore;
pub use title::{default_title, derive_title_from_message, is_default_title};

use serde::{Deserialize, Serialize};

/// Maximum number of sessions kept in the store
pub const MAX_SESSIONS: usize = 50;

/// Maximum number of messages kept per session
pub const MAX_MESSAGES_PER_SESSION: usize = 100;

/// Retention caps applied on every mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionLimits {
    /// Sessions beyond this count are evicted, least recently updated first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Messages beyond this count are trimmed, oldest first
    #[serde(default = "default_max_messages")]
    pub max_messages_per_session: usize,
}

fn default_max_sessions() -> usize {
    MAX_SESSIONS
}

fn default_max_messages() -> usize {
    MAX_MESSAGES_PER_SESSION
}

impl Default for RetentionLimits {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            max_messages_per_session: default_max_messages(),
        }
    }
}
