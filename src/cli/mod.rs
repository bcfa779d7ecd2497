//! CLI module
//!
//! This module provides the command-line interface for mongo-facade:
//! argument parsing and one handler per command.

pub mod commands;

// Re-exports
pub use commands::{handle_command, Command, CommandType};
