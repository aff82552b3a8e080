//! Cache Entry Module
//!
//! Defines the structure of individual cache entries with TTL support.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached response payload with its absolute expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Instant after which the entry must be treated as absent
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Checks whether the entry has expired.
    ///
    /// An entry is expired once the current instant reaches `expires_at`; an
    /// expired entry is indistinguishable from an absent one and must never
    /// be returned.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_not_expired_before_ttl() {
        let entry = CacheEntry::new(json!("value"), Duration::from_secs(60));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new(json!("value"), Duration::from_millis(50));
        assert!(!entry.is_expired());
        sleep(Duration::from_millis(80));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_entry_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(json!("value"), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
