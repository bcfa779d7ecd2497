//! In-memory native driver used by unit tests

use crate::database::driver::{
    ClientFactory, ClientProperty, DatabaseInfo, NativeClient, NativeCollection, NativeDatabase,
    PropertyValue, ServerOptions,
};
use crate::error::{FacadeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records how it was asked to construct clients
#[derive(Default)]
pub struct MockFactory {
    pub default_calls: AtomicUsize,
    pub server_calls: Mutex<Vec<(String, ServerOptions)>>,
    /// When set, construction fails with this message
    pub fail_with: Mutex<Option<String>>,
    /// Artificial construction delay, to widen race windows
    pub delay: Option<Duration>,
    /// Every client handed out, oldest first
    pub created: Mutex<Vec<Arc<MockClient>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn last_client(&self) -> Option<Arc<MockClient>> {
        self.created.lock().unwrap().last().cloned()
    }

    pub fn constructions(&self) -> usize {
        self.default_calls.load(Ordering::SeqCst) + self.server_calls.lock().unwrap().len()
    }

    async fn build(&self, label: &str) -> Result<Arc<dyn NativeClient>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.fail_with.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(FacadeError::native(message));
        }
        let client = Arc::new(MockClient::new(label));
        self.created.lock().unwrap().push(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn create_default(&self) -> Result<Arc<dyn NativeClient>> {
        self.default_calls.fetch_add(1, Ordering::SeqCst);
        self.build("localhost:27017").await
    }

    async fn create(&self, server: &str, options: &ServerOptions) -> Result<Arc<dyn NativeClient>> {
        self.server_calls
            .lock()
            .unwrap()
            .push((server.to_string(), options.clone()));
        self.build(server).await
    }
}

/// A client that records every call made to it
pub struct MockClient {
    pub label: String,
    pub calls: Mutex<Vec<String>>,
    pub connected: AtomicBool,
}

impl MockClient {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            calls: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NativeClient for MockClient {
    async fn close(&self) -> Result<()> {
        self.record("close".into());
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn connect(&self) -> Result<()> {
        self.record("connect".into());
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn connect_until(&self, deadline: DateTime<Utc>) -> Result<()> {
        self.record("connect_until".into());
        if deadline <= Utc::now() {
            return Err(FacadeError::DeadlineElapsed);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<()> {
        self.record(format!("drop_database:{}", name));
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        self.record("list_databases".into());
        Ok(vec![DatabaseInfo {
            name: "admin".to_string(),
            size_on_disk: 40960,
            empty: false,
        }])
    }

    fn select_database(&self, name: &str) -> Arc<dyn NativeDatabase> {
        self.record(format!("select_database:{}", name));
        Arc::new(MockDatabase::new(name))
    }

    fn property(&self, property: ClientProperty) -> PropertyValue {
        self.record(format!("property:{}", property));
        match property {
            ClientProperty::Connected => PropertyValue::Bool(self.connected.load(Ordering::SeqCst)),
            ClientProperty::Hosts => PropertyValue::List(vec![self.label.clone()]),
            _ => PropertyValue::Unset,
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

pub struct MockDatabase {
    name: String,
    collections: Mutex<Vec<String>>,
    selected: AtomicUsize,
    dropped: AtomicBool,
}

impl MockDatabase {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            collections: Mutex::new(Vec::new()),
            selected: AtomicUsize::new(0),
            dropped: AtomicBool::new(false),
        }
    }

    pub fn add_collection(&self, name: &str) {
        self.collections.lock().unwrap().push(name.to_string());
    }

    pub fn collections_selected(&self) -> usize {
        self.selected.load(Ordering::SeqCst)
    }

    pub fn was_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NativeDatabase for MockDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_collection(&self, name: &str) -> Arc<dyn NativeCollection> {
        self.selected.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockCollection {
            name: name.to_string(),
            database: self.name.clone(),
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.lock().unwrap().clone())
    }

    async fn drop_database(&self) -> Result<()> {
        self.dropped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockCollection {
    name: String,
    database: String,
}

impl NativeCollection for MockCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}
