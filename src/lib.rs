//! Cachefront - a transparent caching front for remote document stores
//!
//! Wraps a remote document-store/search client and adds response caching
//! with TTL eviction, automatic routing of writes into date-bucketed series
//! resources, and sliding-window hit/miss statistics - without changing the
//! calling surface. Calls that request no caching or series routing pass
//! through with exact pass-through semantics.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod instance;
pub mod logging;
pub mod manager;
pub mod series;
pub mod stats;

pub use cache::{CacheBackend, MemoryCache};
pub use client::{Interceptor, RemoteClient};
pub use config::{Config, TimeSpan, TimeUnit};
pub use error::{Error, Result};
pub use instance::Instance;
pub use manager::{Manager, DEFAULT_INSTANCE};
pub use stats::{Stats, StatsSnapshot};
