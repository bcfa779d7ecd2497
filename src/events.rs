//! Event manager
//!
//! A small listener registry shared between a connection and the
//! database handles it creates.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Dispatched before a collection handle is created
pub const PRE_SELECT_COLLECTION: &str = "preSelectCollection";

/// Dispatched after a collection handle is created
pub const POST_SELECT_COLLECTION: &str = "postSelectCollection";

/// Arguments passed to event listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventArgs {
    /// Database the event concerns
    pub database: String,
    /// Collection the event concerns, if any
    pub collection: Option<String>,
}

impl EventArgs {
    pub fn new(database: impl Into<String>, collection: Option<String>) -> Self {
        Self {
            database: database.into(),
            collection,
        }
    }
}

/// Listener callback
pub type Listener = Arc<dyn Fn(&EventArgs) + Send + Sync>;

/// Central point of the event system
#[derive(Default)]
pub struct EventManager {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventManager {
    /// Create an event manager with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an event
    pub fn add_listener(&self, event: impl Into<String>, listener: Listener) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.entry(event.into()).or_default().push(listener);
    }

    /// Check whether any listener is registered for an event
    pub fn has_listeners(&self, event: &str) -> bool {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        listeners.get(event).is_some_and(|l| !l.is_empty())
    }

    /// Invoke every listener registered for `event`, in registration order.
    ///
    /// Returns the number of listeners that ran.
    pub fn dispatch_event(&self, event: &str, args: &EventArgs) -> usize {
        // Clone the list so listeners may register further listeners
        let targets: Vec<Listener> = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            listeners.get(event).cloned().unwrap_or_default()
        };

        for listener in &targets {
            listener(args);
        }
        targets.len()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let mut events: Vec<&String> = listeners.keys().collect();
        events.sort();
        f.debug_struct("EventManager").field("events", &events).finish()
    }
}
