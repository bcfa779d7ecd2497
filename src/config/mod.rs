//! Configuration module
//!
//! This module holds the runtime configuration handed to a connection
//! (logger callback and command prefix) and the persisted settings file.

pub mod storage;

use crate::logging::LoggerCallable;
use std::fmt;

/// Default prefix for MongoDB command operators
pub const DEFAULT_COMMAND_PREFIX: &str = "$";

/// Connection configuration
///
/// Read once when a [`Connection`](crate::database::Connection) is built;
/// later changes to a `Configuration` do not affect existing connections.
#[derive(Clone)]
pub struct Configuration {
    /// Callback used by `log`
    logger_callable: Option<LoggerCallable>,
    /// Prefix for command operators (usually `$`)
    command_prefix: String,
}

impl Configuration {
    /// Create a configuration with no logger and the default command prefix
    pub fn new() -> Self {
        Self {
            logger_callable: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
        }
    }

    /// Set the logger callback
    pub fn with_logger(mut self, logger: LoggerCallable) -> Self {
        self.logger_callable = Some(logger);
        self
    }

    /// Set the command prefix
    pub fn with_command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    /// Get the logger callback
    pub fn logger_callable(&self) -> Option<&LoggerCallable> {
        self.logger_callable.as_ref()
    }

    /// Get the command prefix
    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("logger_callable", &self.logger_callable.is_some())
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}
