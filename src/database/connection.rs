//! Connection facade
//!
//! This module provides [`Connection`], a lazily initialized wrapper around a
//! native MongoDB client. The client is constructed on first use, calls are
//! forwarded to it unchanged, and database handles are cached per name.

use crate::config::Configuration;
use crate::database::driver::{
    ClientFactory, ClientProperty, DatabaseInfo, NativeClient, PropertyValue, ServerOptions,
};
use crate::database::handle::{CollectionHandle, DatabaseHandle, SharedContext};
use crate::database::mongo::MongoClientFactory;
use crate::error::Result;
use crate::events::EventManager;
use crate::logging::LogEntry;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How a connection obtains its native client
#[derive(Clone)]
pub enum ConnectionConfig {
    /// Wrap an already constructed client
    Existing(Arc<dyn NativeClient>),
    /// Construct a client for this server string and options on first use
    Server {
        server: String,
        options: ServerOptions,
    },
    /// Construct a client with the driver defaults on first use
    Default,
}

impl ConnectionConfig {
    /// Target a server with no extra options
    pub fn server(server: impl Into<String>) -> Self {
        ConnectionConfig::Server {
            server: server.into(),
            options: ServerOptions::new(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionConfig::Existing(client) => {
                f.debug_tuple("Existing").field(&client.describe()).finish()
            }
            ConnectionConfig::Server { server, options } => f
                .debug_struct("Server")
                .field("server", server)
                .field("options", options)
                .finish(),
            ConnectionConfig::Default => write!(f, "Default"),
        }
    }
}

/// Two-state initialization flag
enum ClientState {
    Uninitialized,
    Initialized(Arc<dyn NativeClient>),
}

/// Lazily connecting client facade
///
/// The native client is built the first time an operation needs it. After
/// that the connection stays initialized; only [`Connection::set_handle`]
/// swaps the client out.
pub struct Connection {
    /// Server string and options, when not using driver defaults
    server: Option<(String, ServerOptions)>,
    /// Constructs the native client
    factory: Arc<dyn ClientFactory>,
    /// Native client state
    state: Mutex<ClientState>,
    /// Selected databases, one handle per name
    databases: Mutex<HashMap<String, Arc<DatabaseHandle>>>,
    /// Logger, command prefix and events handed to every database handle
    context: SharedContext,
}

impl Connection {
    /// Create a connection backed by the `mongodb` driver
    ///
    /// # Arguments
    /// * `config` - Existing client, server to connect to, or driver defaults
    /// * `configuration` - Logger and command prefix; defaults when `None`
    /// * `event_manager` - Shared with database handles; a new empty one when `None`
    ///
    /// # Example
    /// ```no_run
    /// use mongo_facade::database::{Connection, ConnectionConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let conn = Connection::new(ConnectionConfig::server("localhost:27017"), None, None);
    ///     let db = conn.select_database("app").await?;
    ///     println!("{:?}", db.list_collections().await?);
    ///     Ok(())
    /// }
    /// ```
    pub fn new(
        config: ConnectionConfig,
        configuration: Option<Configuration>,
        event_manager: Option<Arc<EventManager>>,
    ) -> Self {
        Self::with_factory(config, Arc::new(MongoClientFactory::new()), configuration, event_manager)
    }

    /// Create a connection that builds its client through `factory`
    pub fn with_factory(
        config: ConnectionConfig,
        factory: Arc<dyn ClientFactory>,
        configuration: Option<Configuration>,
        event_manager: Option<Arc<EventManager>>,
    ) -> Self {
        let configuration = configuration.unwrap_or_default();
        let event_manager = event_manager.unwrap_or_else(|| Arc::new(EventManager::new()));

        let (server, state) = match config {
            ConnectionConfig::Existing(client) => (None, ClientState::Initialized(client)),
            ConnectionConfig::Server { server, options } => {
                (Some((server, options)), ClientState::Uninitialized)
            }
            ConnectionConfig::Default => (None, ClientState::Uninitialized),
        };

        Self {
            server,
            factory,
            state: Mutex::new(state),
            databases: Mutex::new(HashMap::new()),
            context: SharedContext {
                event_manager,
                logger: configuration.logger_callable().cloned(),
                command_prefix: configuration.command_prefix().to_string(),
            },
        }
    }

    /// Construct the native client if that hasn't happened yet.
    ///
    /// Driver errors are returned as-is and leave the connection
    /// uninitialized, so a later call tries again.
    pub async fn initialize(&self) -> Result<()> {
        self.client().await.map(|_| ())
    }

    /// Initialize if needed and return the native client
    async fn client(&self) -> Result<Arc<dyn NativeClient>> {
        // Held across construction so concurrent callers build one client
        let mut state = self.state.lock().await;
        if let ClientState::Initialized(client) = &*state {
            return Ok(client.clone());
        }

        let created = match &self.server {
            Some((server, options)) => {
                tracing::debug!(server = %server, options = options.len(), "constructing native client");
                self.factory.create(server, options).await
            }
            None => {
                tracing::debug!("constructing native client with driver defaults");
                self.factory.create_default().await
            }
        };

        match created {
            Ok(client) => {
                *state = ClientState::Initialized(client.clone());
                Ok(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, "native client construction failed");
                Err(e)
            }
        }
    }

    /// Replace the native client.
    ///
    /// Marks the connection initialized. Cached database handles keep
    /// the native databases they were created with.
    pub async fn set_handle(&self, client: Arc<dyn NativeClient>) {
        *self.state.lock().await = ClientState::Initialized(client);
    }

    /// The current native client, or `None` if not yet initialized.
    ///
    /// Does not initialize.
    pub async fn handle(&self) -> Option<Arc<dyn NativeClient>> {
        match &*self.state.lock().await {
            ClientState::Initialized(client) => Some(client.clone()),
            ClientState::Uninitialized => None,
        }
    }

    /// Whether a native client exists
    pub async fn is_initialized(&self) -> bool {
        matches!(*self.state.lock().await, ClientState::Initialized(_))
    }

    /// Select a database, creating its handle on first use.
    ///
    /// The same name always yields the same handle for the lifetime of the
    /// connection; cached handles are not re-validated.
    pub async fn select_database(&self, name: &str) -> Result<Arc<DatabaseHandle>> {
        let mut databases = self.databases.lock().await;
        if let Some(existing) = databases.get(name) {
            return Ok(existing.clone());
        }

        let client = self.client().await?;
        tracing::debug!(database = %name, "creating database handle");
        let handle = Arc::new(DatabaseHandle::new(
            client.select_database(name),
            self.context.clone(),
        ));
        databases.insert(name.to_string(), handle.clone());

        Ok(handle)
    }

    /// Select a collection of a database
    pub async fn select_collection(&self, database: &str, collection: &str) -> Result<Arc<CollectionHandle>> {
        let db = self.select_database(database).await?;
        Ok(db.select_collection(collection))
    }

    /// Close the native connection
    pub async fn close(&self) -> Result<()> {
        self.client().await?.close().await
    }

    /// Connect the native client to the server
    pub async fn connect(&self) -> Result<()> {
        self.client().await?.connect().await
    }

    /// Connect, giving up once `deadline` has passed
    pub async fn connect_until(&self, deadline: DateTime<Utc>) -> Result<()> {
        self.client().await?.connect_until(deadline).await
    }

    /// Drop a database
    pub async fn drop_database(&self, name: &str) -> Result<()> {
        self.client().await?.drop_database(name).await
    }

    /// List the databases on the server
    pub async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        self.client().await?.list_databases().await
    }

    /// Read a native client property
    pub async fn property(&self, property: ClientProperty) -> Result<PropertyValue> {
        Ok(self.client().await?.property(property))
    }

    /// Describe the server(s) the native client talks to
    pub async fn server_description(&self) -> Result<String> {
        Ok(self.client().await?.describe())
    }

    /// Log an entry through the configured logger.
    ///
    /// Fails with [`FacadeError::NoLogger`](crate::error::FacadeError::NoLogger)
    /// when the connection was built without one.
    pub fn log(&self, entry: &LogEntry) -> Result<()> {
        self.context.log(entry)
    }

    /// Whether a logger callback is configured
    pub fn has_logger(&self) -> bool {
        self.context.logger.is_some()
    }

    /// Command prefix handed to database handles
    pub fn command_prefix(&self) -> &str {
        &self.context.command_prefix
    }

    /// Event manager handed to database handles
    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.context.event_manager
    }

    /// Names of the databases selected so far, sorted
    pub async fn cached_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}
