use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::trace;

use super::{
    path_segments,
    tree::{normalize, resolve_server_values, value_at, write_at},
    SharedStore, StoreError, Watch, WatchEvent,
};
use crate::clock::{Clock, SystemClock};

/// In-process store holding the whole tree in memory.
///
/// Every handle shares one tree, so several controllers pointed at the same
/// `Arc<MemoryStore>` behave like clients of one hosted database. Writes
/// resolve server timestamps with the store's own clock.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

struct Inner {
    root: Value,
    watchers: Vec<Watcher>,
    fail_reads: bool,
    fail_writes: bool,
    fail_watches: bool,
}

struct Watcher {
    path: Vec<String>,
    last: Option<Value>,
    sender: mpsc::UnboundedSender<WatchEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store stamping server time from the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty store stamping server time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                root: Value::Object(Map::new()),
                watchers: Vec::new(),
                fail_reads: false,
                fail_writes: false,
                fail_watches: false,
            }),
            clock,
        }
    }

    /// Make subsequent reads fail, to exercise degraded paths.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Make subsequent writes fail, to exercise degraded paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Make subsequent watches fail to attach.
    pub fn set_fail_watches(&self, fail: bool) {
        self.inner.lock().fail_watches = fail;
    }

    /// Number of watches still attached.
    pub fn watcher_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.watchers.retain(|watcher| !watcher.sender.is_closed());
        inner.watchers.len()
    }

    fn write(&self, writes: Vec<(Vec<String>, Value)>) -> Result<(), StoreError> {
        let now_ms = self.clock.now_ms();
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        for (segments, value) in writes {
            let value = normalize(resolve_server_values(value, now_ms));
            trace!(path = %segments.join("/"), "memory store write");
            write_at(&mut inner.root, &segments, value);
        }
        inner.notify();
        Ok(())
    }
}

impl Inner {
    fn notify(&mut self) {
        let root = &self.root;
        self.watchers.retain_mut(|watcher| {
            let current = value_at(root, &watcher.path).cloned();
            if current == watcher.last {
                return !watcher.sender.is_closed();
            }
            watcher.last = current.clone();
            watcher.sender.send(WatchEvent::Value(current)).is_ok()
        });
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock();
        if inner.fail_reads {
            return Err(StoreError::Unavailable("reads are disabled".to_string()));
        }
        Ok(value_at(&inner.root, &path_segments(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.write(vec![(path_segments(path), value)])
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let base = path_segments(path);
        let writes = fields
            .into_iter()
            .map(|(key, value)| {
                let mut segments = base.clone();
                segments.extend(path_segments(&key));
                (segments, value)
            })
            .collect();
        self.write(writes)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.write(vec![(path_segments(path), Value::Null)])
    }

    async fn watch(&self, path: &str) -> Result<Watch, StoreError> {
        let segments = path_segments(path);
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        if inner.fail_watches {
            return Err(StoreError::Unavailable("watches are disabled".to_string()));
        }
        let current = value_at(&inner.root, &segments).cloned();
        // The receiver is still in hand, so the initial send cannot fail.
        let _ = sender.send(WatchEvent::Value(current.clone()));
        inner.watchers.push(Watcher {
            path: segments,
            last: current,
            sender,
        });
        Ok(Watch::new(receiver, None))
    }
}
