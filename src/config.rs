// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dynamic key/value configuration source
//!
//! Every effective mutation publishes a new version on a watch channel
//! so a server under test can hot-reload settings mid-test. A batch
//! guard suspends publication: mutations made while any guard is alive
//! only raise a dirty flag, and dropping the outermost guard publishes a
//! single coalesced notification. Counter, flag and data share one lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    data: HashMap<String, String>,
    batch_depth: usize,
    dirty: bool,
    version: u64,
}

/// In-memory configuration source with change notification.
#[derive(Clone)]
pub struct DynamicConfig {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<watch::Sender<u64>>,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicConfig {
    /// Create an empty configuration source.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                data: HashMap::new(),
                batch_depth: 0,
                dirty: false,
                version: 0,
            })),
            notify: Arc::new(notify),
        }
    }

    /// Get a configuration value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().data.get(key).cloned()
    }

    /// Set a configuration entry. Setting a key to the value it already
    /// holds is a no-op and publishes nothing.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let mut inner = self.inner.lock();
        if inner.data.get(&key) != Some(&value) {
            inner.data.insert(key, value);
            self.on_changed(&mut inner);
        }
    }

    /// Remove a key. Returns true when the key existed.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.data.remove(key).is_some() {
            self.on_changed(&mut inner);
            true
        } else {
            false
        }
    }

    /// All current entries.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock();
        inner
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Current published version.
    pub fn version(&self) -> u64 {
        *self.notify.borrow()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Suspend notifications until the returned guard (and every other
    /// outstanding guard) is dropped. Nestable.
    pub fn batch(&self) -> BatchGuard {
        self.inner.lock().batch_depth += 1;
        BatchGuard {
            inner: self.inner.clone(),
            notify: self.notify.clone(),
        }
    }

    fn on_changed(&self, inner: &mut Inner) {
        publish(inner, &self.notify);
    }
}

/// Scoped suspension of configuration notifications.
pub struct BatchGuard {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<watch::Sender<u64>>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        inner.batch_depth -= 1;
        if inner.batch_depth == 0 && inner.dirty {
            inner.dirty = false;
            inner.version += 1;
            self.notify.send_replace(inner.version);
        }
    }
}

fn publish(inner: &mut Inner, notify: &watch::Sender<u64>) {
    if inner.batch_depth > 0 {
        inner.dirty = true;
    } else {
        inner.dirty = false;
        inner.version += 1;
        notify.send_replace(inner.version);
    }
}
