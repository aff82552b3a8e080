//! Call Interceptor
//!
//! Presents the same calling surface as the underlying remote client while
//! transparently applying caching, statistics and series routing to every
//! classified operation. Operations outside the classification tables pass
//! straight through.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use crate::cache::CacheBackend;
use crate::client::ops::{op_table, OpTraits};
use crate::client::RemoteClient;
use crate::error::Result;
use crate::series::SeriesRouter;
use crate::stats::Stats;

// == Cache Directive ==
/// The caller's caching wish, carried on the parameters object and stripped
/// before the remote client sees them.
enum CacheDirective {
    /// Cache under this explicit key
    Key(String),
    /// Derive the key from the target resource and type
    Derive,
}

// == Interceptor ==
/// Wraps a remote client with cache, stats and series-routing policy.
pub struct Interceptor {
    name: String,
    remote: Arc<dyn RemoteClient>,
    cache: Arc<dyn CacheBackend>,
    stats: Stats,
    series: Arc<SeriesRouter>,
    ops: HashMap<&'static str, OpTraits>,
}

impl Interceptor {
    /// Assembles the interceptor and its dispatch table.
    pub fn new(
        name: &str,
        remote: Arc<dyn RemoteClient>,
        cache: Arc<dyn CacheBackend>,
        stats: Stats,
        series: Arc<SeriesRouter>,
    ) -> Self {
        Self {
            name: name.to_string(),
            remote,
            cache,
            stats,
            series,
            ops: op_table(),
        }
    }

    /// Invokes a named operation on the remote client, applying cache and
    /// series-routing policy for classified operations.
    ///
    /// Per call: probe the cache for query kinds (short-circuiting on a
    /// hit), rewrite series targets for resource-mutating kinds, delegate,
    /// then populate or invalidate the cache from the outcome. Errors from
    /// the remote client surface unchanged; a failing cache fetch is treated
    /// as a miss so the remote store stays reachable when the cache is not.
    pub async fn call(&self, op: &str, params: Value) -> Result<Value> {
        let Some(traits) = self.ops.get(op).copied() else {
            // Unlisted operations are forwarded untouched.
            return self.remote.execute(op, params).await;
        };
        let mut params = params;
        let cache_key = match take_cache_directive(&mut params) {
            Some(CacheDirective::Key(key)) => Some(key),
            Some(CacheDirective::Derive) => Some(format!(
                "{}:{}",
                param_str(&params, "index"),
                param_str(&params, "type")
            )),
            None => None,
        };

        match &cache_key {
            // Only query-kind operations may short-circuit on a hit; a
            // keyed write still has to reach the remote store.
            Some(key) if traits.query => match self.cache.fetch(key).await {
                Ok(Some(cached)) => {
                    self.stats.record_hit(key).await;
                    return Ok(cached);
                }
                Ok(None) => self.stats.record_miss(key).await,
                Err(err) => {
                    warn!(
                        "{}: cache fetch for \"{}\" failed, treating as miss: {}",
                        self.name, key, err
                    );
                    self.stats.record_miss(key).await;
                }
            },
            Some(key) => self.stats.record_request(key).await,
            None => {
                // Keep an activity signal for non-cached calls too.
                let key = format!(
                    "{}:{}:{}",
                    param_str(&params, "index"),
                    param_str(&params, "type"),
                    param_str(&params, "id")
                );
                self.stats.record_request(&key).await;
            }
        }

        if traits.indexable {
            self.series.rewrite(self.remote.as_ref(), &mut params).await;
        }

        // Captured after series rewriting so the envelope carries the
        // resolved bucket name.
        let echo = if traits.add && cache_key.is_some() {
            Some(read_envelope(&params))
        } else {
            None
        };

        let result = self.remote.execute(op, params).await?;

        if let Some(key) = &cache_key {
            if traits.delete {
                self.cache.remove(key).await?;
            } else if let Some(envelope) = echo {
                self.cache.store(key, envelope).await?;
            } else {
                self.cache.store(key, result.clone()).await?;
            }
        }
        Ok(result)
    }
}

/// Removes the cache directive from the parameters, if any. The remote
/// client must never see this field.
fn take_cache_directive(params: &mut Value) -> Option<CacheDirective> {
    match params.as_object_mut()?.remove("cache")? {
        Value::String(key) => Some(CacheDirective::Key(key)),
        Value::Bool(true) => Some(CacheDirective::Derive),
        _ => None,
    }
}

fn param_str<'a>(params: &'a Value, field: &str) -> &'a str {
    params.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Reshapes an add-kind request into the envelope the read path returns, so
/// a later fetch of the same key observes the write.
fn read_envelope(params: &Value) -> Value {
    json!({
        "_index": params.get("index").cloned().unwrap_or(Value::Null),
        "_type": params.get("type").cloned().unwrap_or(Value::Null),
        "_id": params.get("id").cloned().unwrap_or(Value::Null),
        "_source": params.get("body").cloned().unwrap_or(Value::Null),
        "found": true,
    })
}
