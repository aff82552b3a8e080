//! Configuration Module
//!
//! Explicit configuration objects for a cachefront instance. A `Config` is
//! built once (deserialized from file contents or assembled in code) and
//! passed by value into the instance constructor; there is no ambient
//! process-wide registry.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

// == Time Span ==
/// A duration supplied as a single magnitude+unit pair, e.g. `[1, "h"]` or
/// `[100, "ms"]`. A bare number is interpreted as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TimeSpanRepr")]
pub struct TimeSpan {
    amount: u64,
    unit: TimeUnit,
}

/// Time units accepted in configuration, with moment-style short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "ms" | "millisecond" | "milliseconds" => Some(Self::Milliseconds),
            "s" | "second" | "seconds" => Some(Self::Seconds),
            "m" | "minute" | "minutes" => Some(Self::Minutes),
            "h" | "hour" | "hours" => Some(Self::Hours),
            "d" | "day" | "days" => Some(Self::Days),
            "w" | "week" | "weeks" => Some(Self::Weeks),
            _ => None,
        }
    }

    fn millis(&self) -> u64 {
        match self {
            Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
            Self::Weeks => 604_800_000,
        }
    }
}

impl TimeSpan {
    /// Creates a time span from a magnitude and unit.
    pub fn new(amount: u64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    /// Creates a time span measured in milliseconds.
    pub fn from_millis(amount: u64) -> Self {
        Self::new(amount, TimeUnit::Milliseconds)
    }

    /// Converts to a standard duration.
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.amount.saturating_mul(self.unit.millis()))
    }

    /// Returns true if the span is zero length.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

/// Wire representation: either a bare millisecond count or a `[n, "unit"]`
/// pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeSpanRepr {
    Millis(u64),
    Pair(u64, String),
}

impl TryFrom<TimeSpanRepr> for TimeSpan {
    type Error = String;

    fn try_from(repr: TimeSpanRepr) -> std::result::Result<Self, String> {
        match repr {
            TimeSpanRepr::Millis(ms) => Ok(TimeSpan::from_millis(ms)),
            TimeSpanRepr::Pair(amount, unit) => TimeUnit::parse(&unit)
                .map(|unit| TimeSpan::new(amount, unit))
                .ok_or_else(|| format!("unknown time unit \"{}\"", unit)),
        }
    }
}

// == Cache Config ==
/// Selects and parameterizes the cache backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which backing store to use
    #[serde(rename = "type")]
    pub backend: BackendKind,
    /// Time-to-live for cached entries
    pub ttl: TimeSpan,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            ttl: TimeSpan::new(1, TimeUnit::Hours),
        }
    }
}

/// Known cache backend kinds. Alternative backends implementing the
/// [`CacheBackend`](crate::cache::CacheBackend) contract can be injected
/// directly without appearing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
}

// == Stats Config ==
/// Parameterizes the sliding-window statistics collector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// The trailing window for which counters are kept
    pub interval: TimeSpan,
    /// Number of requests to the same key required for the key to appear in
    /// the snapshot report. Zero disables per-key statistics.
    pub threshold: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval: TimeSpan::new(1, TimeUnit::Minutes),
            threshold: 10,
        }
    }
}

// == Mapping Source ==
/// Where index schemas come from: either an inline name→schema map or a
/// directory of per-resource JSON schema files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MappingSource {
    Dir(PathBuf),
    Inline(HashMap<String, Value>),
}

impl Default for MappingSource {
    fn default() -> Self {
        Self::Inline(HashMap::new())
    }
}

impl MappingSource {
    /// Resolves the configured mappings into a name→schema map.
    ///
    /// A missing directory yields an empty map; unparseable schema files are
    /// a configuration error.
    pub fn load(&self) -> Result<HashMap<String, Value>> {
        match self {
            Self::Inline(map) => Ok(map.clone()),
            Self::Dir(dir) => {
                let mut mappings = HashMap::new();
                if !dir.is_dir() {
                    return Ok(mappings);
                }
                let entries = fs::read_dir(dir).map_err(|e| {
                    Error::Configuration(format!(
                        "cannot read schema directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                        continue;
                    };
                    let raw = fs::read_to_string(&path).map_err(|e| {
                        Error::Configuration(format!(
                            "cannot read schema file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let schema: Value = serde_json::from_str(&raw).map_err(|e| {
                        Error::Configuration(format!(
                            "invalid schema file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    mappings.insert(name.to_string(), schema);
                }
                Ok(mappings)
            }
        }
    }
}

// == Config ==
/// Full configuration for one cachefront instance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache backend selection and TTL
    pub cache: CacheConfig,
    /// Statistics window and reporting threshold
    pub stats: StatsConfig,
    /// Index schema definitions applied during setup
    pub indices: MappingSource,
    /// Mappings merged into every index config that does not define its own
    pub default_mappings: Option<Value>,
    /// Settings merged into every index config that does not define its own
    pub default_settings: Option<Value>,
}

impl Config {
    /// Validates configured values that have no sensible zero interpretation.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl.is_zero() {
            return Err(Error::Configuration("cache ttl must be non-zero".into()));
        }
        if self.stats.interval.is_zero() {
            return Err(Error::Configuration(
                "stats interval must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Fills the configured default mappings and settings into an index
    /// config that lacks them. The index config always wins wholesale per
    /// key; defaults are never deep-merged into it.
    pub fn index_config(&self, mut schema: Value) -> Value {
        if let Some(obj) = schema.as_object_mut() {
            if !obj.contains_key("mappings") {
                if let Some(defaults) = &self.default_mappings {
                    obj.insert("mappings".to_string(), defaults.clone());
                }
            }
            if !obj.contains_key("settings") {
                if let Some(defaults) = &self.default_settings {
                    obj.insert("settings".to_string(), defaults.clone());
                }
            }
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timespan_pair() {
        let span: TimeSpan = serde_json::from_value(json!([1, "h"])).unwrap();
        assert_eq!(span.as_duration(), Duration::from_secs(3600));
    }

    #[test]
    fn test_timespan_bare_millis() {
        let span: TimeSpan = serde_json::from_value(json!(60000)).unwrap();
        assert_eq!(span.as_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_timespan_long_units() {
        let span: TimeSpan = serde_json::from_value(json!([30, "days"])).unwrap();
        assert_eq!(span.as_duration(), Duration::from_secs(30 * 86400));
    }

    #[test]
    fn test_timespan_unknown_unit() {
        let result: std::result::Result<TimeSpan, _> =
            serde_json::from_value(json!([5, "fortnights"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.backend, BackendKind::Memory);
        assert_eq!(config.cache.ttl.as_duration(), Duration::from_secs(3600));
        assert_eq!(config.stats.interval.as_duration(), Duration::from_secs(60));
        assert_eq!(config.stats.threshold, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize() {
        let config: Config = serde_json::from_value(json!({
            "cache": { "type": "memory", "ttl": [5, "m"] },
            "stats": { "interval": [30, "s"], "threshold": 3 },
            "indices": { "logs": { "series": { "retain": [30, "d"] } } }
        }))
        .unwrap();
        assert_eq!(config.cache.ttl.as_duration(), Duration::from_secs(300));
        assert_eq!(config.stats.threshold, 3);
        let mappings = config.indices.load().unwrap();
        assert!(mappings.contains_key("logs"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config: Config = serde_json::from_value(json!({
            "cache": { "ttl": 0 }
        }))
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_mapping_source_missing_dir() {
        let source = MappingSource::Dir(PathBuf::from("/nonexistent/schemas"));
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn test_mapping_source_dir_loads_json_files() {
        let dir = std::env::temp_dir().join(format!("cachefront-schemas-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("events.json"),
            r#"{"mappings": {"properties": {"level": {"type": "keyword"}}}}"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let source = MappingSource::Dir(dir.clone());
        let mappings = source.load().unwrap();
        assert_eq!(mappings.len(), 1);
        assert!(mappings["events"]["mappings"]["properties"]["level"].is_object());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_index_config_merges_defaults() {
        let config: Config = serde_json::from_value(json!({
            "default_mappings": { "dynamic": true },
            "default_settings": { "number_of_shards": 8 }
        }))
        .unwrap();

        let merged = config.index_config(json!({ "mappings": { "dynamic": false } }));
        // Explicit mappings win wholesale; missing settings are filled in.
        assert_eq!(merged["mappings"]["dynamic"], json!(false));
        assert_eq!(merged["settings"]["number_of_shards"], json!(8));
    }
}
