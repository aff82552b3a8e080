//! In-Memory Cache Backend
//!
//! Reference [`CacheBackend`] keeping entries in a HashMap with one spawned
//! expiry task per key. Storing a key again cancels the pending task and
//! starts a fresh one, so the last write always owns the expiry.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::cache::{CacheBackend, CacheEntry};
use crate::error::{Error, Result};

// == Memory Cache ==
/// In-process cache with per-entry TTL timers.
pub struct MemoryCache {
    ttl: Duration,
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl MemoryCache {
    /// Creates a memory cache with the given entry TTL.
    ///
    /// A zero TTL would make every entry expire on arrival and is rejected.
    pub fn new(ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(Error::Configuration("cache ttl must be non-zero".into()));
        }
        Ok(Self {
            ttl,
            inner: Arc::new(Mutex::new(Inner::default())),
        })
    }

    /// Number of live (possibly expired but not yet collected) entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Returns true when the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    fn spawn_expiry(&self, key: String) -> JoinHandle<()> {
        let ttl = self.ttl;
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut inner = inner.lock().await;
            // A timer racing a concurrent re-store must not delete the fresh
            // entry; the re-check under the lock decides ownership.
            let expired = inner
                .entries
                .get(&key)
                .map(|entry| entry.is_expired())
                .unwrap_or(false);
            if expired {
                inner.entries.remove(&key);
                inner.timers.remove(&key);
            }
        })
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn fetch(&self, key: &str) -> Result<Option<Value>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn store(&self, key: &str, value: Value) -> Result<()> {
        // Stamp the entry before its timer starts so the timer can never
        // fire ahead of the recorded expiry.
        let entry = CacheEntry::new(value, self.ttl);
        let handle = self.spawn_expiry(key.to_string());
        let mut inner = self.inner.lock().await;
        inner.entries.insert(key.to_string(), entry);
        if let Some(previous) = inner.timers.insert(key.to_string(), handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<Value>> {
        let mut inner = self.inner.lock().await;
        if let Some(timer) = inner.timers.remove(key) {
            timer.abort();
        }
        Ok(inner
            .entries
            .remove(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        inner.entries.clear();
    }
}
