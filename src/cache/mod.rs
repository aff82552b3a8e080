//! Cache Module
//!
//! Defines the backend contract for response caching and provides the
//! in-memory reference backend with per-entry TTL expiry.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{BackendKind, CacheConfig};
use crate::error::Result;

mod entry;
mod memory;


// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryCache;

// == Cache Backend Contract ==
/// Key→value store with per-entry TTL and sliding renewal.
///
/// The reference implementation is [`MemoryCache`]; alternatives (e.g. a
/// shared external cache) can be swapped in as long as they honor this
/// contract. Transport failures of a distributed backend surface through the
/// `Result` channel of each method; callers are expected to distinguish
/// `Ok(None)` ("no data") from `Err` ("cache unavailable").
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Looks up a key. A hit does not renew the entry's TTL; only `store`
    /// does.
    async fn fetch(&self, key: &str) -> Result<Option<Value>>;

    /// Upserts a value and (re)starts the TTL timer for the key. Any timer
    /// already pending for the key is cancelled first.
    async fn store(&self, key: &str, value: Value) -> Result<()>;

    /// Deletes a value and cancels its pending expiry timer, returning the
    /// previous value. Removing a nonexistent key is a successful no-op.
    async fn remove(&self, key: &str) -> Result<Option<Value>>;

    /// Cancels every pending timer and empties the store.
    async fn clear(&self);
}

// == Backend Factory ==
/// Builds the configured cache backend.
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>> {
    match config.backend {
        BackendKind::Memory => Ok(Arc::new(MemoryCache::new(config.ttl.as_duration())?)),
    }
}
