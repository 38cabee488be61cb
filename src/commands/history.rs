use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::history::query::validate_import;
use crate::storage::Session;
use chrono::{Local, TimeZone};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = super::open_store(config)?;

    match command {
        HistoryCommand::List { limit, json } => {
            let sessions = match limit {
                Some(limit) => store.recent_sessions(limit),
                None => store.list_sessions(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }

            if sessions.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            println!("\nChat History:");
            print_session_table(&sessions);
            println!();
            println!(
                "Use {} to read a session.",
                "josai history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let Some(session) = store.get_session(&id) else {
                println!("{}", format!("No session with id {}", id).yellow());
                return Ok(());
            };

            println!("{}", session.title.bold());
            println!(
                "{} created {}, updated {}",
                session.id.cyan(),
                format_timestamp(session.created_at),
                format_timestamp(session.last_updated_at)
            );
            println!();

            for message in &session.messages {
                let speaker = if message.is_user {
                    "You".green().bold()
                } else {
                    "Jos AI".blue().bold()
                };
                println!("{} [{}]", speaker, format_timestamp(message.timestamp));
                println!("{}", message.text);
                println!();
            }
        }
        HistoryCommand::Search { query } => {
            let sessions = if query.trim().is_empty() {
                store.list_sessions()
            } else {
                store.search_sessions(&query)
            };

            if sessions.is_empty() {
                println!("{}", format!("No sessions match \"{}\".", query).yellow());
                return Ok(());
            }

            println!("\n{} matching session(s):", sessions.len());
            print_session_table(&sessions);
            println!();
        }
        HistoryCommand::New { title } => {
            let session = store.create_session(title.as_deref())?;
            println!(
                "{} {} ({})",
                "Created session".green(),
                session.id.cyan(),
                session.title
            );
        }
        HistoryCommand::Rename { id, title } => {
            if store.get_session(&id).is_none() {
                println!("{}", format!("No session with id {}", id).yellow());
                return Ok(());
            }
            store.update_session_title(&id, &title)?;
            println!("{}", format!("Renamed session {} to \"{}\"", id, title).green());
        }
        HistoryCommand::Delete { id } => {
            let existed = store.get_session(&id).is_some();
            store.delete_session(&id)?;
            if existed {
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!("{}", format!("No session with id {}", id).yellow());
            }
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                println!(
                    "{}",
                    "This deletes every stored session. Re-run with --yes to confirm.".yellow()
                );
                return Ok(());
            }
            store.clear_all()?;
            println!("{}", "Cleared all chat history.".green());
        }
        HistoryCommand::Export { output } => {
            let data = store.export_history()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, data)?;
                    println!(
                        "{}",
                        format!("Exported chat history to {}", path.display()).green()
                    );
                }
                None => println!("{}", data),
            }
        }
        HistoryCommand::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            // Surface the reason; import_history only reports success
            validate_import(&raw)?;
            store.import_history(&raw)?;
            println!(
                "{}",
                format!(
                    "Imported {} session(s) from {}",
                    store.list_sessions().len(),
                    file.display()
                )
                .green()
            );
        }
        HistoryCommand::Stats => {
            let stats = store.storage_stats()?;
            println!("\nStorage Statistics:");
            println!("  Sessions:     {}", stats.session_count);
            println!("  Messages:     {}", stats.total_messages);
            println!("  Size:         {}", stats.storage_size);
            println!("  File:         {}", stats.file_path.display());
            if !stats.file_exists {
                println!("  {}", "History file did not exist yet.".yellow());
            }
            println!();
        }
    }

    Ok(())
}

fn print_session_table(sessions: &[Session]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        table.add_row(prettytable::row![
            session.id.cyan(),
            shorten(&session.title, 40),
            session.messages.len(),
            format_timestamp(session.last_updated_at)
        ]);
    }

    table.printstd();
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn format_timestamp(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}
