//! Statistics Module
//!
//! Sliding-window hit/miss/request counters, global and per-key. Every
//! increment schedules an exactly-matching decrement after the configured
//! window, approximating a trailing-window total without retaining
//! historical timestamps.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::StatsConfig;

// == Snapshot Types ==
/// Point-in-time view of cache activity over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Name of the instance the stats were collected for
    pub source: String,
    /// Total number of cache look-ups (hits + misses)
    pub total: u64,
    /// Hit count and ratio against the current total
    pub hit: CounterReport,
    /// Miss count and ratio against the current total
    pub miss: CounterReport,
    /// Per-key details for keys that crossed the reporting threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<KeyStats>>,
}

/// A counter together with its share of the snapshot-time total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterReport {
    pub count: u64,
    pub ratio: f64,
}

/// Per-key activity over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStats {
    pub key: String,
    pub request: u64,
    pub hit: u64,
    pub miss: u64,
}

// == Stats Collector ==
/// Decaying hit/miss/request counters for one instance.
///
/// Cloning is cheap and shares the underlying counters.
#[derive(Clone)]
pub struct Stats {
    name: String,
    window: Duration,
    threshold: u64,
    inner: Arc<Mutex<Counters>>,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    keys: HashMap<String, KeyCounters>,
}

#[derive(Default)]
struct KeyCounters {
    request: u64,
    hit: u64,
    miss: u64,
}

/// Which counter a scheduled decay applies to.
enum Counter {
    Hit,
    Miss,
    KeyRequest(String),
    KeyHit(String),
    KeyMiss(String),
}

impl Stats {
    /// Creates a collector for the named instance.
    pub fn new(config: &StatsConfig, name: &str) -> Self {
        Self {
            name: name.to_string(),
            window: config.interval.as_duration(),
            threshold: config.threshold,
            inner: Arc::new(Mutex::new(Counters::default())),
        }
    }

    /// Records a request for a key independent of whether the cache was
    /// consulted. Called implicitly by `record_hit` and `record_miss`.
    pub async fn record_request(&self, key: &str) {
        if self.threshold == 0 {
            return;
        }
        {
            let mut counters = self.inner.lock().await;
            counters.keys.entry(key.to_string()).or_default().request += 1;
        }
        self.schedule_decay(Counter::KeyRequest(key.to_string()));
    }

    /// Records a cache hit for a key.
    pub async fn record_hit(&self, key: &str) {
        self.record_request(key).await;
        {
            let mut counters = self.inner.lock().await;
            counters.hits += 1;
            if self.threshold > 0 {
                counters.keys.entry(key.to_string()).or_default().hit += 1;
            }
        }
        self.schedule_decay(Counter::Hit);
        if self.threshold > 0 {
            self.schedule_decay(Counter::KeyHit(key.to_string()));
        }
    }

    /// Records a cache miss for a key.
    pub async fn record_miss(&self, key: &str) {
        self.record_request(key).await;
        {
            let mut counters = self.inner.lock().await;
            counters.misses += 1;
            if self.threshold > 0 {
                counters.keys.entry(key.to_string()).or_default().miss += 1;
            }
        }
        self.schedule_decay(Counter::Miss);
        if self.threshold > 0 {
            self.schedule_decay(Counter::KeyMiss(key.to_string()));
        }
    }

    /// Returns the current stats over the trailing window, or `None` when no
    /// cache look-ups happened inside it. Ratios are computed against the
    /// snapshot-time total.
    pub async fn snapshot(&self) -> Option<StatsSnapshot> {
        let counters = self.inner.lock().await;
        let total = counters.hits + counters.misses;
        if total == 0 {
            return None;
        }
        let mut keys: Vec<KeyStats> = counters
            .keys
            .iter()
            .filter(|(_, kc)| self.threshold > 0 && kc.request >= self.threshold)
            .map(|(key, kc)| KeyStats {
                key: key.clone(),
                request: kc.request,
                hit: kc.hit,
                miss: kc.miss,
            })
            .collect();
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        Some(StatsSnapshot {
            source: self.name.clone(),
            total,
            hit: CounterReport {
                count: counters.hits,
                ratio: counters.hits as f64 / total as f64,
            },
            miss: CounterReport {
                count: counters.misses,
                ratio: counters.misses as f64 / total as f64,
            },
            keys: if keys.is_empty() { None } else { Some(keys) },
        })
    }

    /// Schedules the decrement that reverses one increment once the window
    /// has elapsed. The task holds only a weak reference, so dropped
    /// collectors do not linger past their window.
    fn schedule_decay(&self, counter: Counter) {
        let window = self.window;
        let weak: Weak<Mutex<Counters>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut counters = inner.lock().await;
            match counter {
                Counter::Hit => counters.hits = counters.hits.saturating_sub(1),
                Counter::Miss => counters.misses = counters.misses.saturating_sub(1),
                Counter::KeyRequest(key) => {
                    if let Some(kc) = counters.keys.get_mut(&key) {
                        kc.request = kc.request.saturating_sub(1);
                    }
                }
                Counter::KeyHit(key) => {
                    if let Some(kc) = counters.keys.get_mut(&key) {
                        kc.hit = kc.hit.saturating_sub(1);
                    }
                }
                Counter::KeyMiss(key) => {
                    if let Some(kc) = counters.keys.get_mut(&key) {
                        kc.miss = kc.miss.saturating_sub(1);
                    }
                }
            }
        });
    }
}
