//! Command handlers for CLI
//!
//! This module implements the commands of the mongo-facade tool. Each
//! command runs a single operation through a [`Connection`].

use crate::database::{ClientProperty, Connection};
use crate::error::{FacadeError, Result};
use chrono::{Duration, Utc};

/// Seconds `ping` waits for the server
const PING_TIMEOUT_SECS: i64 = 5;

/// Command types
#[derive(Debug, Clone, PartialEq)]
pub enum CommandType {
    /// Check the server is reachable
    Ping,
    /// List databases
    List,
    /// Drop a database
    Drop { database: String },
    /// List the collections of a database
    Collections { database: String },
    /// Show client properties
    Info,
    /// Show help message
    Help,
}

/// Parsed command
#[derive(Debug, Clone)]
pub struct Command {
    /// The type of command
    pub command_type: CommandType,
}

impl Command {
    /// Parse a command from command-line arguments (program name excluded)
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let parts: Vec<&str> = args.iter().map(|a| a.as_ref().trim()).collect();
        let Some(&cmd) = parts.first() else {
            return Ok(Command {
                command_type: CommandType::Help,
            });
        };

        let command_type = match cmd {
            "ping" => CommandType::Ping,
            "list" => CommandType::List,
            "info" => CommandType::Info,
            "help" | "--help" | "-h" => CommandType::Help,
            "drop" => CommandType::Drop {
                database: required_arg(&parts, cmd, "drop <database>")?,
            },
            "collections" => CommandType::Collections {
                database: required_arg(&parts, cmd, "collections <database>")?,
            },
            _ => return Err(FacadeError::UnknownCommand(cmd.to_string())),
        };

        Ok(Command { command_type })
    }
}

fn required_arg(parts: &[&str], command: &str, expected: &str) -> Result<String> {
    match parts.get(1) {
        Some(arg) if !arg.is_empty() => Ok(arg.to_string()),
        _ => Err(FacadeError::InvalidCommandSyntax {
            command: command.to_string(),
            expected: expected.to_string(),
        }),
    }
}

/// Handle a command and return the result message
pub async fn handle_command(command: &Command, connection: &Connection) -> Result<String> {
    match &command.command_type {
        CommandType::Ping => {
            let deadline = Utc::now() + Duration::seconds(PING_TIMEOUT_SECS);
            connection.connect_until(deadline).await?;
            let server = connection.server_description().await?;
            Ok(format!("✓ {} is reachable", server))
        }
        CommandType::List => {
            let databases = connection.list_databases().await?;
            if databases.is_empty() {
                return Ok("No databases".to_string());
            }
            let lines: Vec<String> = databases
                .iter()
                .map(|db| {
                    let marker = if db.empty { " (empty)" } else { "" };
                    format!("{:<24} {:>12} bytes{}", db.name, db.size_on_disk, marker)
                })
                .collect();
            Ok(lines.join("\n"))
        }
        CommandType::Drop { database } => {
            connection.drop_database(database).await?;
            Ok(format!("✓ Dropped database: {}", database))
        }
        CommandType::Collections { database } => {
            let db = connection.select_database(database).await?;
            let mut names = db.list_collections().await?;
            names.sort();
            if names.is_empty() {
                Ok(format!("No collections in {}", database))
            } else {
                Ok(names.join("\n"))
            }
        }
        CommandType::Info => {
            let mut lines = Vec::new();
            for property in [
                ClientProperty::Hosts,
                ClientProperty::ReplicaSet,
                ClientProperty::AppName,
                ClientProperty::DefaultDatabase,
                ClientProperty::Connected,
            ] {
                let value = connection.property(property).await?;
                lines.push(format!("{:<16} {}", property.name(), value));
            }
            lines.push(format!("{:<16} {}", "commandPrefix", connection.command_prefix()));
            Ok(lines.join("\n"))
        }
        CommandType::Help => Ok(help_text()),
    }
}

/// Usage text
pub fn help_text() -> String {
    r#"
Usage: mongo-facade <command>

Commands:
  ping                    Check the server answers within 5 seconds
  list                    List databases
  drop <database>         Drop a database
  collections <database>  List the collections of a database
  info                    Show client properties
  help                    Show this help message

Settings are read from the mongo-facade config.toml; MONGO_FACADE_SERVER
overrides the configured server.
"#
    .trim()
    .to_string()
}
