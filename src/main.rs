//! Jos AI - editor assistant chat history
//!
#![doc = "Jos AI - editor assistant chat history"]
#![doc = "Main entry point for the josai command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use josai::cli::{Cli, Commands};
use josai::commands;
use josai::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/josai.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { session, message } => {
            tracing::info!("Sending chat message");
            if let Some(s) = &session {
                tracing::debug!("Continuing session: {}", s);
            }
            commands::chat::run_chat(config, session, message).await?;
            Ok(())
        }
        Commands::Bridge => {
            tracing::info!("Starting presentation bridge");
            commands::bridge::run_bridge(config).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr; stdout carries command output and bridge events.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "josai=debug" } else { "josai=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
