//! Command-line interface definition for Jos AI
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting, managing history, and running the
//! editor bridge.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Jos AI - editor assistant chat history
///
/// Sends chat messages to the configured model provider and keeps the
/// conversation history in a local JSON document.
#[derive(Parser, Debug, Clone)]
#[command(name = "josai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/josai.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Workspace root; history is kept under `<workspace>/.josai/`
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Explicit history file (overrides workspace and data directory)
    #[arg(long, env = "JOSAI_HISTORY_FILE", global = true)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Jos AI
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one chat message and print the reply
    Chat {
        /// Continue this session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,

        /// Message text
        message: String,
    },

    /// Serve the presentation protocol as JSON lines on stdin/stdout
    Bridge,

    /// Manage stored chat history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List sessions, most recently updated first
    List {
        /// Maximum number of sessions to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show every message of a session
    Show {
        /// Session id
        id: String,
    },

    /// Find sessions whose title or messages contain the query
    Search {
        /// Case-insensitive search text; empty lists everything
        query: String,
    },

    /// Create an empty session
    New {
        /// Session title (defaults to a timestamp label)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Rename a session
    Rename {
        /// Session id
        id: String,
        /// New title
        title: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },

    /// Delete every session
    Clear {
        /// Confirm the irreversible delete
        #[arg(long)]
        yes: bool,
    },

    /// Export all sessions as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all history with an exported JSON file
    Import {
        /// File produced by `history export`
        file: PathBuf,
    },

    /// Show session/message counts and storage size
    Stats,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/josai.yaml".to_string()),
            verbose: false,
            workspace: None,
            storage_path: None,
            command: Commands::History {
                command: HistoryCommand::List {
                    limit: None,
                    json: false,
                },
            },
        }
    }
}
