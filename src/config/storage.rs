//! Settings Storage
//!
//! This module handles the persisted connection settings: server string,
//! connection options and command prefix, stored as TOML.

use crate::config::{Configuration, DEFAULT_COMMAND_PREFIX};
use crate::database::{ConnectionConfig, ServerOptions};
use crate::error::{FacadeError, Result};
use crate::logging;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file name
const SETTINGS_FILE: &str = "config.toml";

/// Persistent connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Server string; the driver default is used when absent
    #[serde(default)]
    pub server: Option<String>,
    /// Connection string options
    #[serde(default)]
    pub options: ServerOptions,
    /// Command prefix
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Forward `log` entries to tracing
    #[serde(default)]
    pub log_commands: bool,
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: None,
            options: ServerOptions::new(),
            command_prefix: default_command_prefix(),
            log_commands: false,
        }
    }
}

impl Settings {
    /// Create empty settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the settings directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FacadeError::Config("Could not find configuration directory".to_string()))?
            .join("mongo-facade");

        Ok(config_dir)
    }

    /// Get the settings file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load settings from a file, returning defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    /// Save settings to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    /// Build the connection target described by these settings
    pub fn connection_config(&self) -> ConnectionConfig {
        match &self.server {
            Some(server) => ConnectionConfig::Server {
                server: server.clone(),
                options: self.options.clone(),
            },
            None => ConnectionConfig::Default,
        }
    }

    /// Build the runtime configuration described by these settings
    pub fn configuration(&self) -> Configuration {
        let config = Configuration::new().with_command_prefix(self.command_prefix.clone());
        if self.log_commands {
            config.with_logger(logging::tracing_logger())
        } else {
            config
        }
    }
}
