//! Database module
//!
//! This module provides the lazily connecting [`Connection`] facade,
//! the handles it hands out and the native driver it wraps.

pub mod connection;
pub mod driver;
pub mod handle;
pub mod mongo;

#[cfg(test)]
pub(crate) mod mock;

// Re-exports
pub use connection::{Connection, ConnectionConfig};
pub use driver::{
    ClientFactory, ClientProperty, DatabaseInfo, NativeClient, NativeCollection, NativeDatabase,
    PropertyValue, ServerOptions,
};
pub use handle::{CollectionHandle, DatabaseHandle};
pub use mongo::MongoClientFactory;
