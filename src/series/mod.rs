//! Series Index Module
//!
//! Translates logical index names into date-bucketed concrete resource
//! names (`logs` → `logs-2024.05.01`), creating each day's backing resource
//! the first time its bucket is seen. Creation is best-effort: a failed
//! existence check or create call is logged and the computed name is used
//! regardless, so writes are never blocked on mapping setup.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::RemoteClient;
use crate::config::TimeSpan;
use crate::error::{Error, Result};

mod date;

pub use date::{bucket_name, extract_timestamp};

/// Bulk action tags that carry a target index of their own.
const BULK_ACTIONS: [&str; 3] = ["index", "update", "delete"];

// == Series Descriptor ==
/// Registration record for one logical series name.
#[derive(Debug, Clone)]
pub struct SeriesDescriptor {
    /// How long dated resources should be kept around. Parsed and surfaced
    /// but not acted upon; aged-resource deletion is deferred.
    pub retention: TimeSpan,
    /// Schema applied to each newly created dated resource, with the series
    /// marker already stripped.
    pub schema: Value,
    /// The most recently created concrete resource name.
    pub last_index: Option<String>,
}

// == Series Router ==
/// Maps logical series names to daily buckets and lazily creates the
/// backing resources.
///
/// The descriptor table lives behind one async mutex, and `last_index` is
/// advanced under that lock before the create call goes out, so two
/// concurrent writes rotating into the same fresh bucket cannot both issue
/// a create.
pub struct SeriesRouter {
    name: String,
    series: Mutex<HashMap<String, SeriesDescriptor>>,
}

impl SeriesRouter {
    /// Creates an empty router for the named instance.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            series: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `index` as a series if its schema carries a series marker.
    ///
    /// The marker (`"series": {"retain": [n, "unit"]}`) is stripped from the
    /// schema so resource-creation calls never see it. Returns false for
    /// plain schemas, which the caller creates directly instead.
    pub async fn register(&self, index: &str, schema: &mut Value) -> Result<bool> {
        let Some(marker) = schema.as_object_mut().and_then(|obj| obj.remove("series")) else {
            return Ok(false);
        };
        let retain = marker.get("retain").cloned().ok_or_else(|| {
            Error::Configuration(format!(
                "series \"{}\" is missing the retain duration",
                index
            ))
        })?;
        let retention: TimeSpan = serde_json::from_value(retain).map_err(|e| {
            Error::Configuration(format!("series \"{}\" has an invalid retain duration: {}", index, e))
        })?;
        let mut series = self.series.lock().await;
        series.insert(
            index.to_string(),
            SeriesDescriptor {
                retention,
                schema: schema.clone(),
                last_index: None,
            },
        );
        Ok(true)
    }

    /// Returns true if `index` was registered as a series.
    pub async fn is_registered(&self, index: &str) -> bool {
        self.series.lock().await.contains_key(index)
    }

    /// Returns the advisory retention of a registered series.
    pub async fn retention(&self, index: &str) -> Option<TimeSpan> {
        self.series.lock().await.get(index).map(|d| d.retention)
    }

    /// Resolves a series name to today's concrete bucket for `record`,
    /// creating the backing resource on the first sighting of the bucket.
    ///
    /// Unregistered names indicate a caller bug and are returned unchanged
    /// with a warning. Creation failures are logged and the computed bucket
    /// name is still returned.
    pub async fn resolve(
        &self,
        client: &dyn RemoteClient,
        index: &str,
        record: Option<&Value>,
    ) -> String {
        let timestamp = date::extract_timestamp(record);
        let mut series = self.series.lock().await;
        let Some(descriptor) = series.get_mut(index) else {
            warn!(
                "{}: trying to get dynamic index name for non-series index \"{}\"",
                self.name, index
            );
            return index.to_string();
        };
        let bucket = date::bucket_name(index, timestamp);
        if descriptor.last_index.as_deref() == Some(bucket.as_str()) {
            return bucket;
        }
        // Recorded before the create call so a concurrent resolve for the
        // same bucket short-circuits instead of creating twice.
        descriptor.last_index = Some(bucket.clone());
        let schema = descriptor.schema.clone();
        drop(series);
        if let Err(err) = self.ensure_resource(client, &bucket, &schema).await {
            error!("{}: {}", self.name, err);
        }
        bucket
    }

    /// Rewrites the target resource name(s) of a write payload in place.
    ///
    /// Bulk payloads (no top-level index, array body) have each action entry
    /// resolved independently and in original order; everything else has its
    /// top-level `index` parameter replaced when it names a registered
    /// series.
    pub async fn rewrite(&self, client: &dyn RemoteClient, params: &mut Value) {
        if params.get("index").is_none() && params.get("body").map_or(false, Value::is_array) {
            self.rewrite_bulk(client, params).await;
            return;
        }
        let Some(index) = params.get("index").and_then(Value::as_str).map(String::from) else {
            return;
        };
        if !self.is_registered(&index).await {
            return;
        }
        let record = params.get("body").cloned();
        let bucket = self.resolve(client, &index, record.as_ref()).await;
        params["index"] = Value::String(bucket);
    }

    async fn rewrite_bulk(&self, client: &dyn RemoteClient, params: &mut Value) {
        let Some(len) = params.get("body").and_then(Value::as_array).map(Vec::len) else {
            return;
        };
        for i in 0..len {
            let Some(action) = bulk_action(&params["body"][i]) else {
                continue;
            };
            let Some(target) = params["body"][i][action]
                .get("_index")
                .and_then(Value::as_str)
                .map(String::from)
            else {
                continue;
            };
            if !self.is_registered(&target).await {
                continue;
            }
            // The timestamp lives in the source line that follows an
            // index/update action; deletes carry no source.
            let record = if action != "delete" {
                params["body"]
                    .get(i + 1)
                    .filter(|line| bulk_action(line).is_none())
                    .cloned()
            } else {
                None
            };
            let bucket = self.resolve(client, &target, record.as_ref()).await;
            params["body"][i][action]["_index"] = Value::String(bucket);
        }
    }

    /// Checks resource existence and creates it with the given schema only
    /// if absent. Creation is not retried; the caller proceeds with the name
    /// either way.
    pub async fn ensure_resource(
        &self,
        client: &dyn RemoteClient,
        index: &str,
        schema: &Value,
    ) -> Result<()> {
        let exists = client.index_exists(index).await.map_err(|e| Error::MappingSetup {
            index: index.to_string(),
            message: e.to_string(),
        })?;
        if exists {
            return Ok(());
        }
        info!("{}: creating new index \"{}\"", self.name, index);
        client
            .create_index(index, schema)
            .await
            .map_err(|e| Error::MappingSetup {
                index: index.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

fn bulk_action(line: &Value) -> Option<&'static str> {
    BULK_ACTIONS.into_iter().find(|tag| line.get(tag).is_some())
}
