//! Database and collection handles
//!
//! A [`DatabaseHandle`] is created once per database name by a
//! [`Connection`](crate::database::Connection) and shared from then on.
//! It caches its own [`CollectionHandle`]s the same way.

use crate::database::driver::{NativeCollection, NativeDatabase};
use crate::error::{FacadeError, Result};
use crate::events::{self, EventArgs, EventManager};
use crate::logging::{LogEntry, LoggerCallable};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Logger and command prefix shared by a connection and its handles
#[derive(Clone)]
pub(crate) struct SharedContext {
    pub(crate) event_manager: Arc<EventManager>,
    pub(crate) logger: Option<LoggerCallable>,
    pub(crate) command_prefix: String,
}

impl SharedContext {
    pub(crate) fn log(&self, entry: &LogEntry) -> Result<()> {
        let logger = self.logger.as_ref().ok_or(FacadeError::NoLogger)?;
        logger(entry);
        Ok(())
    }
}

/// A selected database
pub struct DatabaseHandle {
    native: Arc<dyn NativeDatabase>,
    context: SharedContext,
    collections: Mutex<HashMap<String, Arc<CollectionHandle>>>,
}

impl DatabaseHandle {
    pub(crate) fn new(native: Arc<dyn NativeDatabase>, context: SharedContext) -> Self {
        Self {
            native,
            context,
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Database name
    pub fn name(&self) -> &str {
        self.native.name()
    }

    /// The wrapped native database
    pub fn native(&self) -> &Arc<dyn NativeDatabase> {
        &self.native
    }

    /// Command prefix inherited from the connection
    pub fn command_prefix(&self) -> &str {
        &self.context.command_prefix
    }

    /// Event manager inherited from the connection
    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.context.event_manager
    }

    /// Select a collection, creating its handle on first use.
    ///
    /// Repeated calls with the same name return the same handle.
    /// `preSelectCollection` and `postSelectCollection` are dispatched
    /// only when a new handle is created, with the cache unlocked.
    pub fn select_collection(&self, name: &str) -> Arc<CollectionHandle> {
        if let Some(existing) = self.cached_collection(name) {
            return existing;
        }

        let args = EventArgs::new(self.name(), Some(name.to_string()));
        self.context
            .event_manager
            .dispatch_event(events::PRE_SELECT_COLLECTION, &args);

        let (handle, created) = {
            let mut collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
            match collections.entry(name.to_string()) {
                Entry::Occupied(existing) => (existing.get().clone(), false),
                Entry::Vacant(slot) => {
                    tracing::debug!(database = %self.name(), collection = %name, "creating collection handle");
                    let handle = Arc::new(CollectionHandle {
                        native: self.native.select_collection(name),
                        context: self.context.clone(),
                    });
                    (slot.insert(handle).clone(), true)
                }
            }
        };

        if created {
            self.context
                .event_manager
                .dispatch_event(events::POST_SELECT_COLLECTION, &args);
        }

        handle
    }

    fn cached_collection(&self, name: &str) -> Option<Arc<CollectionHandle>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// List collection names in this database
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.native.list_collections().await
    }

    /// Drop this database
    pub async fn drop_database(&self) -> Result<()> {
        self.native.drop_database().await
    }

    /// Log an entry through the configured logger
    pub fn log(&self, entry: &LogEntry) -> Result<()> {
        self.context.log(entry)
    }
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("name", &self.name())
            .field("command_prefix", &self.context.command_prefix)
            .finish()
    }
}

/// A selected collection
pub struct CollectionHandle {
    native: Arc<dyn NativeCollection>,
    context: SharedContext,
}

impl CollectionHandle {
    /// Collection name
    pub fn name(&self) -> &str {
        self.native.name()
    }

    /// Name of the owning database
    pub fn database_name(&self) -> &str {
        self.native.database_name()
    }

    /// Namespace in `<db>.<collection>` form
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.database_name(), self.name())
    }

    /// The wrapped native collection
    pub fn native(&self) -> &Arc<dyn NativeCollection> {
        &self.native
    }

    /// Log an entry through the configured logger
    pub fn log(&self, entry: &LogEntry) -> Result<()> {
        self.context.log(entry)
    }
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("full_name", &self.full_name())
            .finish()
    }
}
