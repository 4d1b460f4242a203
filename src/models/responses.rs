//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, Tier};

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Tier that answered
    pub tier: Tier,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value, tier: Tier) -> Self {
        Self {
            key: key.into(),
            value,
            tier,
        }
    }
}

/// Response body for PUT /cache
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// TTL applied, in seconds
    pub ttl: u64,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl,
        }
    }
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was invalidated
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated", key),
            key,
        }
    }
}

/// Response body for POST /metrics/refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// Window whose summary was dropped
    pub days: u32,
    /// Whether a remembered summary existed
    pub refreshed: bool,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Reads answered by either tier over all reads
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// "connected" or "local_only"
    pub cache_mode: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(remote_available: bool) -> Self {
        let cache_mode = if remote_available {
            "connected"
        } else {
            "local_only"
        };
        Self {
            status: "healthy".to_string(),
            cache_mode: cache_mode.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", json!({"a": 1}), Tier::Local);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["value"]["a"], 1);
        assert_eq!(json["tier"], "local");
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", 60);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            local_hits: 3,
            local_misses: 1,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();
        assert_eq!(json["local_hits"], 3);
        assert_eq!(json["hit_rate"], 0.75);
        assert_eq!(json["remote_available"], false);
    }

    #[test]
    fn test_health_response_modes() {
        assert_eq!(HealthResponse::healthy(true).cache_mode, "connected");
        let resp = HealthResponse::healthy(false);
        assert_eq!(resp.cache_mode, "local_only");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
