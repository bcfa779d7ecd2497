// mongo-facade: run one driver operation through the lazy connection facade
//
// This is the main entry point for the mongo-facade tool.

use anyhow::{Context, Result};
use mongo_facade::cli::{handle_command, Command};
use mongo_facade::config::storage::Settings;
use mongo_facade::logging;
use mongo_facade::Connection;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured server
const SERVER_ENV: &str = "MONGO_FACADE_SERVER";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args[..])?;

    let mut settings = Settings::load().context("Failed to load settings")?;
    if let Ok(server) = std::env::var(SERVER_ENV) {
        settings.server = Some(server);
    }
    tracing::debug!(server = ?settings.server, "settings loaded");

    let connection = Connection::new(settings.connection_config(), Some(settings.configuration()), None);
    if connection.has_logger() {
        connection.log(&logging::entry(json!({
            "level": "info",
            "command": format!("{:?}", command.command_type),
        })))?;
    }

    let output = handle_command(&command, &connection).await?;
    println!("{}", output);

    Ok(())
}
