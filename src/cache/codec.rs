//! Entry Codec Module
//!
//! Converts cache values to and from the JSON text stored in the networked tier.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Value Conversion ==
/// Converts any serializable value into the tier-neutral [`Value`] form.
///
/// Fails with `Encoding` for values serde_json cannot represent, such as maps
/// keyed by non-string types.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CacheError::Encoding(e.to_string()))
}

/// Converts a stored [`Value`] back into a concrete type.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| CacheError::Decoding(e.to_string()))
}

// == Encode / Decode ==
/// Serializes a value into transport-safe UTF-8 JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Encoding(e.to_string()))
}

/// Inverse of [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Decoding(e.to_string()))
}

// == Stored Entry ==
/// Envelope written to the networked tier.
///
/// Carries its own insertion time and TTL so freshness can be re-checked on
/// read even if the remote store's own expiry lags or is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// The cached payload
    pub value: Value,
    /// Insertion time (Unix milliseconds)
    pub inserted_at_ms: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
}

impl StoredEntry {
    /// Creates an envelope stamped at `now_ms`.
    pub fn new(value: Value, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            inserted_at_ms: now_ms,
            ttl_ms,
        }
    }

    /// True while `now - inserted_at < ttl`.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.inserted_at_ms) < self.ttl_ms
    }

    /// Encodes the envelope for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    /// Decodes an envelope read from the wire.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}
