//! Error types for mongo-facade
//!
//! This module defines the error types used throughout the crate.
//! Driver errors are carried unchanged; the facade adds only the
//! few failure kinds it can produce on its own.

use thiserror::Error;

/// Result type alias for mongo-facade
pub type Result<T> = std::result::Result<T, FacadeError>;

/// Main error type for mongo-facade
#[derive(Error, Debug)]
pub enum FacadeError {
    /// Errors raised by the MongoDB driver, passed through as-is
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    /// Errors raised by other native client bindings
    #[error("Native client error: {0}")]
    Native(String),

    /// `log` was called but no logger callback was configured
    #[error("No logger configured")]
    NoLogger,

    /// A deadline passed before the server answered
    #[error("Deadline elapsed before the server could be reached")]
    DeadlineElapsed,

    /// Unknown command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command given with the wrong arguments
    #[error("Invalid syntax for '{command}'. Expected: {expected}")]
    InvalidCommandSyntax { command: String, expected: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Failed to parse settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl FacadeError {
    /// Build a `Native` error from anything displayable
    pub fn native(message: impl std::fmt::Display) -> Self {
        FacadeError::Native(message.to_string())
    }
}
