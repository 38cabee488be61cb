//! Presentation-layer protocol
//!
//! The editor panel sends [`UiCommand`] objects and renders the [`UiEvent`]
//! objects it gets back. Both are JSON tagged by a `command` field, one
//! object per line when spoken over stdin/stdout by [`Bridge::run`].

use crate::chat::ChatService;
use crate::error::{JosaiError, Result};
use crate::history::SharedSessionStore;
use crate::providers::Provider;
use crate::storage::{Message, Session, StorageStats};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Command sent by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiCommand {
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        message: String,
        #[serde(default)]
        session_id: Option<String>,
    },
    CreateSession {
        #[serde(default)]
        title: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    LoadSession { session_id: String },
    #[serde(rename_all = "camelCase")]
    DeleteSession { session_id: String },
    #[serde(alias = "clearAllHistory")]
    ClearHistory,
    #[serde(alias = "refreshHistory")]
    RequestChatHistory,
    SearchSessions {
        #[serde(default)]
        query: String,
    },
    ExportHistory,
    ImportHistory { data: String },
    StorageStats,
}

/// Payload sent back to the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiEvent {
    ChatHistory { sessions: Vec<Session> },
    LoadSessionMessages { messages: Vec<Message> },
    #[serde(rename_all = "camelCase")]
    NewSession { session_id: String },
    CreatedSession { session: Session },
    ChatResponse { text: String },
    SearchResults { sessions: Vec<Session> },
    ExportedHistory { data: String },
    ImportResult { success: bool },
    StorageStats { stats: StorageStats },
    Error { message: String },
}

/// Dispatches presentation commands to the chat service and store
pub struct Bridge<P: Provider + ?Sized> {
    chat: ChatService<P>,
    recent_limit: usize,
}

impl<P: Provider + ?Sized> Bridge<P> {
    pub fn new(chat: ChatService<P>, recent_limit: usize) -> Self {
        Self { chat, recent_limit }
    }

    fn store(&self) -> &SharedSessionStore {
        self.chat.store()
    }

    /// Handle one command; failures become a trailing [`UiEvent::Error`]
    pub async fn handle(&self, command: UiCommand) -> Vec<UiEvent> {
        match self.dispatch(command).await {
            Ok(events) => events,
            Err(e) => vec![UiEvent::Error {
                message: user_facing_message(&e),
            }],
        }
    }

    async fn dispatch(&self, command: UiCommand) -> Result<Vec<UiEvent>> {
        let events = match command {
            UiCommand::ChatMessage {
                message,
                session_id,
            } => {
                let turn = self.chat.send(session_id.as_deref(), &message).await?;
                let mut events = Vec::new();
                if turn.created_session {
                    events.push(UiEvent::NewSession {
                        session_id: turn.session_id.clone(),
                    });
                }
                events.push(UiEvent::ChatResponse {
                    text: turn.reply.text,
                });
                events.push(self.chat_history().await);
                events
            }
            UiCommand::CreateSession { title } => {
                let session = self.store().create_session(title.as_deref()).await?;
                vec![
                    UiEvent::CreatedSession { session },
                    self.chat_history().await,
                ]
            }
            UiCommand::LoadSession { session_id } => {
                match self.store().get_session(&session_id).await {
                    Some(session) => vec![UiEvent::LoadSessionMessages {
                        messages: session.messages,
                    }],
                    None => return Err(JosaiError::SessionNotFound(session_id).into()),
                }
            }
            UiCommand::DeleteSession { session_id } => {
                self.store().delete_session(&session_id).await?;
                vec![self.chat_history().await]
            }
            UiCommand::ClearHistory => {
                self.store().clear_all().await?;
                vec![self.chat_history().await]
            }
            UiCommand::RequestChatHistory => vec![self.chat_history().await],
            UiCommand::SearchSessions { query } => {
                let sessions = if query.trim().is_empty() {
                    self.store().list_sessions().await
                } else {
                    self.store().search_sessions(&query).await
                };
                vec![UiEvent::SearchResults { sessions }]
            }
            UiCommand::ExportHistory => vec![UiEvent::ExportedHistory {
                data: self.store().export_history().await?,
            }],
            UiCommand::ImportHistory { data } => {
                let success = self.store().import_history(&data).await?;
                let mut events = vec![UiEvent::ImportResult { success }];
                if success {
                    events.push(self.chat_history().await);
                }
                events
            }
            UiCommand::StorageStats => vec![UiEvent::StorageStats {
                stats: self.store().storage_stats().await?,
            }],
        };
        Ok(events)
    }

    async fn chat_history(&self) -> UiEvent {
        UiEvent::ChatHistory {
            sessions: self.store().recent_sessions(self.recent_limit).await,
        }
    }

    /// Serve JSON-line commands from `reader`, writing JSON-line events
    ///
    /// Returns when `reader` reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let events = match serde_json::from_str::<UiCommand>(line) {
                Ok(command) => {
                    tracing::debug!(?command, "Bridge command");
                    self.handle(command).await
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed bridge command");
                    vec![UiEvent::Error {
                        message: format!("Unrecognized command: {}", e),
                    }]
                }
            };

            for event in events {
                let mut encoded = serde_json::to_string(&event)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
            }
            writer.flush().await?;
        }
        Ok(())
    }

    /// Serve the protocol on the process's stdin and stdout
    pub async fn run_stdio(&self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        self.run(stdin, tokio::io::stdout()).await
    }
}

/// Actionable text for a failed command
fn user_facing_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<JosaiError>() {
        Some(JosaiError::StorageWrite(detail)) => format!(
            "Could not save chat history ({}). Check that the history location is writable and the disk is not full.",
            detail
        ),
        Some(JosaiError::SessionNotFound(id)) => {
            format!("Conversation {} no longer exists. Start a new chat to continue.", id)
        }
        _ => format!("Something went wrong: {}", err),
    }
}
