//! MongoDB driver binding
//!
//! Implements the native driver traits on top of the `mongodb` crate.
//! Building a client parses the connection string and starts the driver's
//! background monitoring; no command is sent until an operation needs one.

use crate::database::driver::{
    ClientFactory, ClientProperty, DatabaseInfo, NativeClient, NativeCollection, NativeDatabase,
    PropertyValue, ServerOptions,
};
use crate::error::{FacadeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Server used when none is configured
pub const DEFAULT_SERVER: &str = "mongodb://localhost:27017";

/// Build a connection string from a server string and options.
///
/// A missing scheme defaults to `mongodb://`; options are percent-encoded
/// and appended as query parameters after any already present.
pub fn connection_string(server: &str, options: &ServerOptions) -> String {
    let mut uri = if server.contains("://") {
        server.to_string()
    } else {
        format!("mongodb://{}", server)
    };

    if options.is_empty() {
        return uri;
    }

    if uri.contains('?') {
        if !uri.ends_with('?') && !uri.ends_with('&') {
            uri.push('&');
        }
    } else {
        let hosts_start = uri.find("://").map(|i| i + 3).unwrap_or(0);
        if !uri[hosts_start..].contains('/') {
            uri.push('/');
        }
        uri.push('?');
    }

    let query = options
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&");
    uri.push_str(&query);

    uri
}

/// Builds clients with the `mongodb` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoClientFactory;

impl MongoClientFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClientFactory for MongoClientFactory {
    async fn create_default(&self) -> Result<Arc<dyn NativeClient>> {
        self.create(DEFAULT_SERVER, &ServerOptions::new()).await
    }

    async fn create(&self, server: &str, options: &ServerOptions) -> Result<Arc<dyn NativeClient>> {
        let uri = connection_string(server, options);
        let client_options = ClientOptions::parse(uri.as_str()).await?;
        let client = MongoClient::from_options(client_options)?;
        Ok(Arc::new(client))
    }
}

/// The live driver client, rebuilt from the same options after a close
struct ClientSlot {
    options: ClientOptions,
    client: Mutex<Option<Client>>,
}

impl ClientSlot {
    /// The live client, reopening it if it was shut down
    fn client(&self) -> Result<Client> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        tracing::debug!(hosts = ?self.hosts(), "reopening closed client");
        let client = Client::with_options(self.options.clone())?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Remove the live client, leaving the slot closed
    fn take(&self) -> Option<Client> {
        self.client.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn is_open(&self) -> bool {
        self.client.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn hosts(&self) -> Vec<String> {
        self.options.hosts.iter().map(|h| h.to_string()).collect()
    }
}

/// A `mongodb::Client` plus the options it was built from
pub struct MongoClient {
    slot: Arc<ClientSlot>,
    connected: AtomicBool,
}

impl MongoClient {
    /// Build a client from parsed options
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let client = Client::with_options(options.clone())?;
        Ok(Self {
            slot: Arc::new(ClientSlot {
                options,
                client: Mutex::new(Some(client)),
            }),
            connected: AtomicBool::new(false),
        })
    }

    /// The underlying driver client, reopened if it was closed
    pub fn client(&self) -> Result<Client> {
        self.slot.client()
    }

    /// Whether a driver client is currently open
    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    async fn ping(&self) -> Result<()> {
        self.client()?
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl NativeClient for MongoClient {
    async fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(client) = self.slot.take() {
            client.shutdown().await;
        }
        Ok(())
    }

    async fn connect(&self) -> Result<()> {
        self.ping().await
    }

    async fn connect_until(&self, deadline: DateTime<Utc>) -> Result<()> {
        let remaining = (deadline - Utc::now())
            .to_std()
            .map_err(|_| FacadeError::DeadlineElapsed)?;

        match tokio::time::timeout(remaining, self.ping()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(hosts = ?self.slot.hosts(), "server not reachable before deadline");
                Err(FacadeError::DeadlineElapsed)
            }
        }
    }

    async fn drop_database(&self, name: &str) -> Result<()> {
        self.client()?.database(name).drop().await?;
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let specs = self.client()?.list_databases().await?;
        Ok(specs
            .into_iter()
            .map(|spec| DatabaseInfo {
                name: spec.name,
                size_on_disk: spec.size_on_disk,
                empty: spec.empty,
            })
            .collect())
    }

    fn select_database(&self, name: &str) -> Arc<dyn NativeDatabase> {
        Arc::new(MongoDatabase {
            name: name.to_string(),
            slot: self.slot.clone(),
        })
    }

    fn property(&self, property: ClientProperty) -> PropertyValue {
        let options = &self.slot.options;
        match property {
            ClientProperty::Connected => PropertyValue::Bool(self.connected.load(Ordering::SeqCst)),
            ClientProperty::Hosts => PropertyValue::List(self.slot.hosts()),
            ClientProperty::ReplicaSet => PropertyValue::from_option(options.repl_set_name.clone()),
            ClientProperty::AppName => PropertyValue::from_option(options.app_name.clone()),
            ClientProperty::DefaultDatabase => {
                PropertyValue::from_option(options.default_database.clone())
            }
        }
    }

    fn describe(&self) -> String {
        self.slot.hosts().join(",")
    }
}

/// A database of a `MongoClient`.
///
/// Resolves the client on every call, so it keeps working after the
/// client is closed and reopened.
pub struct MongoDatabase {
    name: String,
    slot: Arc<ClientSlot>,
}

impl MongoDatabase {
    /// The underlying driver database
    pub fn database(&self) -> Result<Database> {
        Ok(self.slot.client()?.database(&self.name))
    }
}

#[async_trait]
impl NativeDatabase for MongoDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_collection(&self, name: &str) -> Arc<dyn NativeCollection> {
        Arc::new(MongoCollection {
            name: name.to_string(),
            database: self.name.clone(),
            slot: self.slot.clone(),
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.database()?.list_collection_names().await?)
    }

    async fn drop_database(&self) -> Result<()> {
        self.database()?.drop().await?;
        Ok(())
    }
}

/// A collection of raw documents in a `MongoDatabase`
pub struct MongoCollection {
    name: String,
    database: String,
    slot: Arc<ClientSlot>,
}

impl MongoCollection {
    /// The underlying driver collection
    pub fn collection(&self) -> Result<Collection<Document>> {
        Ok(self
            .slot
            .client()?
            .database(&self.database)
            .collection::<Document>(&self.name))
    }
}

impl NativeCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}
