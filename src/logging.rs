//! Logger callbacks
//!
//! Callers opt into logging by handing a callback to [`Configuration`];
//! the facade and its handles invoke it only when `log` is called.
//!
//! [`Configuration`]: crate::config::Configuration

use serde_json::{Map, Value};
use std::sync::Arc;

/// A structured log entry: a mapping of field names to values
pub type LogEntry = Map<String, Value>;

/// Callback invoked with each logged entry
pub type LoggerCallable = Arc<dyn Fn(&LogEntry) + Send + Sync>;

/// Build a `LogEntry` from a JSON value.
///
/// Objects are used as-is; any other value is stored under `"value"`.
pub fn entry(value: Value) -> LogEntry {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// A logger that forwards entries to `tracing`.
///
/// The entry's `level` field picks the tracing level (`debug` when absent
/// or unknown) and the whole entry is rendered as JSON.
pub fn tracing_logger() -> LoggerCallable {
    Arc::new(|entry: &LogEntry| {
        let level = entry.get("level").and_then(Value::as_str).unwrap_or("debug");
        let rendered = Value::Object(entry.clone()).to_string();
        match level {
            "error" => tracing::error!(entry = %rendered, "mongo log"),
            "warn" => tracing::warn!(entry = %rendered, "mongo log"),
            "info" => tracing::info!(entry = %rendered, "mongo log"),
            "trace" => tracing::trace!(entry = %rendered, "mongo log"),
            _ => tracing::debug!(entry = %rendered, "mongo log"),
        }
    })
}
