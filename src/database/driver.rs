//! Native driver interface
//!
//! The traits in this module describe the native client the facade wraps.
//! [`MongoClientFactory`](crate::database::mongo::MongoClientFactory) binds
//! them to the `mongodb` crate; tests bind them to in-memory mocks.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Connection string options, e.g. `replicaSet` or `connectTimeoutMS`
pub type ServerOptions = BTreeMap<String, String>;

/// Constructs native clients
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Construct a client using the driver's default server
    async fn create_default(&self) -> Result<Arc<dyn NativeClient>>;

    /// Construct a client for `server` with the given options
    async fn create(&self, server: &str, options: &ServerOptions) -> Result<Arc<dyn NativeClient>>;
}

/// A native client connection
#[async_trait]
pub trait NativeClient: Send + Sync {
    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Make sure the server is reachable
    async fn connect(&self) -> Result<()>;

    /// Like `connect`, but give up once `deadline` passes
    async fn connect_until(&self, deadline: DateTime<Utc>) -> Result<()>;

    /// Drop a database
    async fn drop_database(&self, name: &str) -> Result<()>;

    /// List the databases on the server
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>>;

    /// Get a handle to a database. Does not contact the server.
    fn select_database(&self, name: &str) -> Arc<dyn NativeDatabase>;

    /// Read a client property
    fn property(&self, property: ClientProperty) -> PropertyValue;

    /// Human readable description of the server(s) this client talks to
    fn describe(&self) -> String;
}

/// A native database handle
#[async_trait]
pub trait NativeDatabase: Send + Sync {
    /// Database name
    fn name(&self) -> &str;

    /// Get a handle to a collection. Does not contact the server.
    fn select_collection(&self, name: &str) -> Arc<dyn NativeCollection>;

    /// List collection names
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Drop this database
    async fn drop_database(&self) -> Result<()>;
}

/// A native collection handle
pub trait NativeCollection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Name of the owning database
    fn database_name(&self) -> &str;
}

/// An entry of the server's database listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Database name
    pub name: String,
    /// Size on disk in bytes
    pub size_on_disk: u64,
    /// Whether the database holds no data
    pub empty: bool,
}

/// Known client properties readable through the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientProperty {
    /// Whether the client has successfully reached the server
    Connected,
    /// Configured host list
    Hosts,
    /// Replica set name, if configured
    ReplicaSet,
    /// Application name, if configured
    AppName,
    /// Database named in the connection string, if any
    DefaultDatabase,
}

impl ClientProperty {
    /// Property name as it appears in connection strings and logs
    pub fn name(&self) -> &'static str {
        match self {
            ClientProperty::Connected => "connected",
            ClientProperty::Hosts => "hosts",
            ClientProperty::ReplicaSet => "replicaSet",
            ClientProperty::AppName => "appName",
            ClientProperty::DefaultDatabase => "defaultDatabase",
        }
    }
}

impl fmt::Display for ClientProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Value of a client property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
    Unset,
}

impl PropertyValue {
    /// Build a value from an optional string
    pub fn from_option(value: Option<String>) -> Self {
        value.map(PropertyValue::Text).unwrap_or(PropertyValue::Unset)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::List(items) => write!(f, "{}", items.join(",")),
            PropertyValue::Unset => write!(f, "(unset)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names() {
        assert_eq!(ClientProperty::ReplicaSet.to_string(), "replicaSet");
        assert_eq!(ClientProperty::Connected.name(), "connected");
    }

    #[test]
    fn test_property_value_display() {
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
        assert_eq!(
            PropertyValue::List(vec!["a:1".into(), "b:2".into()]).to_string(),
            "a:1,b:2"
        );
        assert_eq!(PropertyValue::from_option(None), PropertyValue::Unset);
        assert_eq!(
            PropertyValue::from_option(Some("rs0".into())),
            PropertyValue::Text("rs0".into())
        );
    }
}
