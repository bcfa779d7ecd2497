//! mongo-facade Library
//!
//! A lazily connecting wrapper around the MongoDB driver that caches
//! database handles and offers opt-in logging and events.
//! The command line tool is in src/main.rs.

pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;

pub use config::Configuration;
pub use database::{Connection, ConnectionConfig};
pub use error::{FacadeError, Result};
