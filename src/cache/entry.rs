//! Cache Entry Module
//!
//! Defines the structure of entries held in the local tier.

use std::time::Duration;

use serde_json::Value;

// == Cache Entry ==
/// A single local-tier entry with its insertion time and TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Time to live
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now_ms`.
    pub fn new(value: Value, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once `now - inserted_at >= ttl`,
    /// so a zero TTL is expired immediately.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.inserted_at) >= self.ttl_ms()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms` (0 once expired).
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        let expires_at = self.inserted_at.saturating_add(self.ttl_ms());
        expires_at.saturating_sub(now_ms)
    }

    fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!("test_value"), 1_000, Duration::from_secs(60));

        assert_eq!(entry.value, json!("test_value"));
        assert_eq!(entry.inserted_at, 1_000);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(json!(5), 0, Duration::from_secs(2));

        assert!(!entry.is_expired(1_999));
        assert!(entry.is_expired(2_000), "Entry should be expired at boundary");
        assert!(entry.is_expired(3_000));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new(json!(null), 500, Duration::ZERO);
        assert!(entry.is_expired(500));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new(json!(1), 1_000, Duration::from_secs(10));

        assert_eq!(entry.ttl_remaining_ms(1_000), 10_000);
        assert_eq!(entry.ttl_remaining_ms(4_500), 6_500);
        assert_eq!(entry.ttl_remaining_ms(11_000), 0);
        assert_eq!(entry.ttl_remaining_ms(50_000), 0);
    }

    #[test]
    fn test_clock_behind_insertion_is_fresh() {
        // Clock went backwards between insert and read.
        let entry = CacheEntry::new(json!(1), 10_000, Duration::from_secs(1));
        assert!(!entry.is_expired(9_000));
    }
}
