//! Cache Module
//!
//! Two-tier TTL cache: an optional networked store in front of a
//! process-local fallback, plus function memoization on top.

mod clock;
mod codec;
mod entry;
mod key;
mod local;
mod manager;
mod memoize;
mod remote;
mod stats;


use serde::Serialize;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use codec::{decode, encode, from_value, to_value, StoredEntry};
pub use entry::CacheEntry;
pub use key::{CacheKey, CallArgs, KEY_PREFIX};
pub use local::LocalStore;
pub use manager::CacheManager;
pub use memoize::{memoize, MemoScope, MemoizeConfig, Memoized};
pub use remote::{connect, RedisStore, RemoteStore};
pub use stats::CacheStats;

// == Tier ==
/// One of the two backing stores composed by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Remote key/value store shared between processes
    Networked,
    /// In-process store, never shared
    Local,
}
