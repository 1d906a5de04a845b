//! Path-addressed shared store used as the realtime relay between clients.
//!
//! Paths are slash-separated (`rooms/SWEDEN-482/state/reveal`). Writes of
//! `null` delete, empty objects disappear, and a write may carry the
//! [`server_timestamp`] sentinel which the store replaces with its own clock.

mod event_stream;
/// Firebase Realtime Database backend.
pub mod firebase;
/// In-process backend.
pub mod memory;
mod tree;

pub use event_stream::{EventStreamParser, StreamEvent};
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::{sync::mpsc, task::JoinHandle};

/// Key of the server-value placeholder object.
pub const SERVER_VALUE_KEY: &str = ".sv";

/// Errors raised by a [`SharedStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with a non-success status.
    #[error("store responded with {status}: {body}")]
    Http {
        /// HTTP status returned by the backend.
        status: reqwest::StatusCode,
        /// Response body, if any.
        body: String,
    },
    /// Transport-level failure.
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Payload could not be encoded or decoded.
    #[error("invalid store payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// A change stream ended or was cancelled by the backend.
    #[error("change stream closed: {0}")]
    Stream(String),
}

/// Placeholder that the store resolves to its own clock at write time.
pub fn server_timestamp() -> Value {
    json!({ SERVER_VALUE_KEY: "timestamp" })
}

/// Whether `value` is the [`server_timestamp`] placeholder.
pub fn is_server_timestamp(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => map.len() == 1 && map.get(SERVER_VALUE_KEY) == Some(&json!("timestamp")),
        None => false,
    }
}

/// Change notification delivered by a [`Watch`].
#[derive(Debug)]
pub enum WatchEvent {
    /// Current value at the watched path (`None` when absent).
    Value(Option<Value>),
    /// The watch failed and will deliver nothing further.
    Failed(StoreError),
}

/// Live view onto one store path.
///
/// The first event carries the value at subscribe time; later events are
/// only sent when the value changes. Dropping the watch detaches it.
pub struct Watch {
    events: mpsc::UnboundedReceiver<WatchEvent>,
    task: Option<JoinHandle<()>>,
}

impl Watch {
    /// Wrap a receiver, optionally together with the task feeding it.
    pub fn new(events: mpsc::UnboundedReceiver<WatchEvent>, task: Option<JoinHandle<()>>) -> Self {
        Self { events, task }
    }

    /// Wait for the next notification; `None` once the watch is closed.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Hierarchical key/value store with change notification.
#[async_trait]
pub trait SharedStore: Send + Sync + 'static {
    /// Read the value at `path`.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Write several children of `path` at once. Keys may themselves be
    /// slash-separated paths relative to `path`.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the subtree at `path`.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Subscribe to the value at `path`.
    async fn watch(&self, path: &str) -> Result<Watch, StoreError>;
}

/// Split a store path into its non-empty segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
