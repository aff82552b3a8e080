//! Record Timestamp Extraction
//!
//! Picks the instant that decides which daily bucket a record lands in.
//! Client payloads are heterogeneous and carry no declared schema for time
//! fields, so extraction probes a fixed field list with tolerant parsing
//! rules and falls back to the current time.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Fields probed for a record timestamp, in priority order.
const TIME_FIELDS: [&str; 4] = ["timestamp", "@timestamp", "time", "date"];

/// Numbers at or below this are not plausible Unix timestamps.
const MIN_UNIX_TIMESTAMP: i64 = 100_000_000;

/// Numbers below this are seconds precision, at or above already millis.
const MILLIS_CUTOFF: i64 = 100_000_000_000;

/// Extracts the bucket-deciding timestamp from a record, defaulting to now.
pub fn extract_timestamp(record: Option<&Value>) -> DateTime<Utc> {
    if let Some(record) = record {
        for field in TIME_FIELDS {
            if let Some(parsed) = record.get(field).and_then(parse_time_value) {
                return parsed;
            }
        }
    }
    Utc::now()
}

/// Formats the concrete resource name for a series prefix and an instant.
pub fn bucket_name(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, timestamp.format("%Y.%m.%d"))
}

fn parse_time_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n <= MIN_UNIX_TIMESTAMP {
                return None;
            }
            let millis = if n < MILLIS_CUTOFF { n * 1000 } else { n };
            Utc.timestamp_millis_opt(millis).single()
        }
        // Short strings are too ambiguous to trust (ids, levels, ...).
        Value::String(s) if s.len() > 18 => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn close_to_now(ts: DateTime<Utc>) -> bool {
        (Utc::now() - ts).num_seconds().abs() < 5
    }

    #[test]
    fn test_millisecond_timestamp_taken_as_is() {
        let ts = extract_timestamp(Some(&json!({ "timestamp": 1_300_000_000_000_i64 })));
        assert_eq!(ts.timestamp_millis(), 1_300_000_000_000);
    }

    #[test]
    fn test_second_timestamp_scaled_to_millis() {
        let ts = extract_timestamp(Some(&json!({ "timestamp": 130_000_000 })));
        assert_eq!(ts.timestamp_millis(), 130_000_000_000);
    }

    #[test]
    fn test_small_numbers_are_not_timestamps() {
        let ts = extract_timestamp(Some(&json!({ "timestamp": 42 })));
        assert!(close_to_now(ts));
    }

    #[test]
    fn test_rfc3339_string() {
        let ts = extract_timestamp(Some(&json!({ "time": "2024-05-01T12:30:00Z" })));
        assert_eq!(bucket_name("logs", ts), "logs-2024.05.01");
    }

    #[test]
    fn test_short_strings_ignored() {
        let ts = extract_timestamp(Some(&json!({ "date": "2024-05-01" })));
        assert!(close_to_now(ts));
    }

    #[test]
    fn test_field_priority_order() {
        let record = json!({
            "@timestamp": 1_300_000_000_000_i64,
            "timestamp": 1_400_000_000_000_i64,
        });
        assert_eq!(
            extract_timestamp(Some(&record)).timestamp_millis(),
            1_400_000_000_000
        );
    }

    #[test]
    fn test_missing_record_defaults_to_now() {
        assert!(close_to_now(extract_timestamp(None)));
        assert!(close_to_now(extract_timestamp(Some(&json!({ "level": "info" })))));
    }

    proptest! {
        // The seconds heuristic and the millis passthrough agree on the
        // instant they denote.
        #[test]
        fn prop_seconds_and_millis_agree(secs in 100_000_001_i64..99_999_999_999) {
            let from_secs = extract_timestamp(Some(&json!({ "timestamp": secs })));
            let from_millis = extract_timestamp(Some(&json!({ "timestamp": secs * 1000 })));
            prop_assert_eq!(from_secs, from_millis);
            prop_assert_eq!(from_secs.timestamp(), secs);
        }

        // Bucket names always carry the zero-padded calendar day of the
        // extracted instant.
        #[test]
        fn prop_bucket_name_matches_calendar_day(millis in 100_000_000_001_i64..4_100_000_000_000) {
            let ts = extract_timestamp(Some(&json!({ "timestamp": millis })));
            let bucket = bucket_name("logs", ts);
            prop_assert_eq!(&bucket, &format!("logs-{}", ts.format("%Y.%m.%d")));
            // prefix-YYYY.MM.DD
            prop_assert_eq!(bucket.len(), "logs-".len() + 10);
        }

        // Values that match no rule always fall back to the current time.
        #[test]
        fn prop_unrecognized_values_default_to_now(n in -1_000_000_i64..100_000_000) {
            let ts = extract_timestamp(Some(&json!({ "timestamp": n })));
            prop_assert!(close_to_now(ts));
        }
    }
}
