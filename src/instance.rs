//! Instance Module
//!
//! One named cachefront instance: the cache backend, stats collector,
//! series router and interceptor assembled around an injected remote
//! client, plus the initial mapping setup that flips the readiness flag.

use std::sync::Arc;

use futures::future;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::cache::{self, CacheBackend};
use crate::client::{Interceptor, RemoteClient};
use crate::config::Config;
use crate::error::Result;
use crate::series::SeriesRouter;
use crate::stats::{Stats, StatsSnapshot};

// == Instance ==
/// A fully wired caching front for one remote document store.
pub struct Instance {
    name: String,
    config: Config,
    remote: Arc<dyn RemoteClient>,
    cache: Arc<dyn CacheBackend>,
    stats: Stats,
    series: Arc<SeriesRouter>,
    interceptor: Interceptor,
    ready_rx: watch::Receiver<bool>,
}

impl Instance {
    /// Constructs the instance and spawns its mapping setup in the
    /// background. `ready()` flips once setup completes; series-routed
    /// calls issued before that see unregistered series (caller contract,
    /// not enforced here).
    pub fn new(config: Config, remote: Arc<dyn RemoteClient>, name: &str) -> Result<Arc<Self>> {
        config.validate()?;
        let cache = cache::from_config(&config.cache)?;
        let stats = Stats::new(&config.stats, name);
        let series = Arc::new(SeriesRouter::new(name));
        let interceptor = Interceptor::new(
            name,
            remote.clone(),
            cache.clone(),
            stats.clone(),
            series.clone(),
        );
        let (ready_tx, ready_rx) = watch::channel(false);
        let instance = Arc::new(Self {
            name: name.to_string(),
            config,
            remote,
            cache,
            stats,
            series,
            interceptor,
            ready_rx,
        });
        tokio::spawn({
            let instance = instance.clone();
            async move { instance.setup(ready_tx).await }
        });
        Ok(instance)
    }

    /// Applies configured mappings and flips the readiness flag exactly
    /// once. Mapping failures are logged and non-fatal; an unreachable
    /// remote leaves the instance not ready.
    async fn setup(&self, ready_tx: watch::Sender<bool>) {
        debug!("{}: attempting connection to the remote store", self.name);
        if let Err(err) = self.remote.health().await {
            error!(
                "{}: unable to reach the remote document store: {}",
                self.name, err
            );
            return;
        }

        let mappings = match self.config.indices.load() {
            Ok(mappings) => mappings,
            Err(err) => {
                error!("{}: cannot load index schemas: {}", self.name, err);
                Default::default()
            }
        };

        let tasks = mappings.into_iter().map(|(index, schema)| {
            let schema = self.config.index_config(schema);
            async move { self.create_mapping(&index, schema).await }
        });
        for err in future::join_all(tasks).await.into_iter().filter_map(|r| r.err()) {
            error!("{}: {}", self.name, err);
        }

        let _ = ready_tx.send(true);
        info!("{}: instance ready", self.name);
    }

    /// Registers a series or creates a plain resource, depending on whether
    /// the schema carries a series marker.
    pub async fn create_mapping(&self, index: &str, schema: Value) -> Result<()> {
        let mut schema = schema;
        if self.series.register(index, &mut schema).await? {
            return Ok(());
        }
        self.series
            .ensure_resource(self.remote.as_ref(), index, &schema)
            .await
    }

    /// True once initial mapping setup has completed.
    pub fn ready(&self) -> bool {
        *self.ready_rx.borrow()
    }

    /// Waits for the readiness flag. Returns immediately if setup already
    /// completed; also returns (without the flag set) if setup aborted, so
    /// callers that care must check `ready()`.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready_rx.clone();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// The intercepted call surface.
    pub fn client(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Current cache statistics, or `None` when nothing was recorded inside
    /// the trailing window.
    pub async fn stats(&self) -> Option<StatsSnapshot> {
        self.stats.snapshot().await
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empties the cache and cancels its pending expiry timers.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Shuts the instance down, releasing cache entries and timers.
    pub async fn close(&self) {
        self.clear_cache().await;
    }
}
