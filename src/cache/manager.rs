//! Cache Manager Module
//!
//! Composes the networked and local tiers behind one get/set contract.
//! Reads are remote-first with local fallback; writes land locally and,
//! best-effort, remotely. No tier failure ever reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::codec::{self, StoredEntry};
use super::local::LocalStore;
use super::remote::{self, RemoteStore};
use super::stats::{CacheStats, StatsRecorder};
use super::Tier;
use crate::config::Config;

// == Cache Manager ==
/// Two-tier cache shared by every consumer in the process.
///
/// Construct once at startup and hand out `Arc<CacheManager>`.
#[derive(Debug)]
pub struct CacheManager {
    remote: Option<Arc<dyn RemoteStore>>,
    local: LocalStore,
    stats: StatsRecorder,
    default_ttl: Duration,
}

impl CacheManager {
    // == Constructors ==
    /// Creates a manager over an optional remote store and a local store.
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        local: LocalStore,
        default_ttl: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            stats: StatsRecorder::default(),
            default_ttl,
        }
    }

    /// Creates a manager with no networked tier.
    pub fn local_only(default_ttl: Duration) -> Self {
        Self::new(None, LocalStore::new(), default_ttl)
    }

    /// Connects the networked tier described by `config`, degrading to
    /// local-only when it cannot be reached.
    pub async fn from_config(config: &Config) -> Self {
        let remote = remote::connect(&config.remote)
            .await
            .map(|store| Arc::new(store) as Arc<dyn RemoteStore>);
        Self::new(
            remote,
            LocalStore::new(),
            Duration::from_secs(config.default_ttl),
        )
    }

    // == Accessors ==
    /// Whether a networked tier is attached.
    pub fn is_remote_available(&self) -> bool {
        self.remote.is_some()
    }

    /// The process-local tier.
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// TTL applied when callers do not choose one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Looks up `key`, remote tier first, then local.
    ///
    /// A remote hit is returned as-is and is not copied into the local tier.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_with_tier(key).await.map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also reporting which tier answered.
    pub async fn get_with_tier(&self, key: &str) -> Option<(Value, Tier)> {
        if let Some(value) = self.remote_get(key).await {
            return Some((value, Tier::Networked));
        }
        self.get_local(key).map(|value| (value, Tier::Local))
    }

    /// Typed [`get`](Self::get). A stored value of the wrong shape reads as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match codec::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Discarding cached value for {}: {}", key, e);
                None
            }
        }
    }

    /// Looks up `key` in the local tier only.
    pub fn get_local(&self, key: &str) -> Option<Value> {
        let found = self.local.get(key);
        if found.is_some() {
            debug!("Local cache hit: {}", key);
            self.stats.record_hit(Tier::Local);
        } else {
            self.stats.record_miss(Tier::Local);
        }
        found
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` in the local tier and, when
    /// connected, in the networked tier.
    ///
    /// Remote write failures are logged and otherwise ignored.
    pub async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.local.set(key, value.clone(), ttl);
        self.remote_set(key, value, ttl).await;
    }

    /// Typed [`set`](Self::set). A value that cannot be encoded is not cached.
    pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        match codec::to_value(value) {
            Ok(value) => self.set(key, value, ttl).await,
            Err(e) => warn!("Not caching {}: {}", key, e),
        }
    }

    /// Stores `value` under `key` in the local tier only.
    pub fn set_local(&self, key: &str, value: Value, ttl: Duration) {
        self.local.set(key, value, ttl);
    }

    // == Invalidate ==
    /// Removes `key` from both tiers. Returns whether any tier held it.
    pub async fn invalidate(&self, key: &str) -> bool {
        let local = self.local.delete(key);
        let remote = match &self.remote {
            Some(store) => match store.delete(key).await {
                Ok(existed) => existed,
                Err(e) => {
                    warn!("Remote invalidate failed for {}: {}", key, e);
                    self.stats.record_remote_error();
                    false
                }
            },
            None => false,
        };
        local || remote
    }

    /// Drops every local entry. The networked tier is left alone.
    pub fn clear_local(&self) {
        self.local.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.local.len(), self.is_remote_available())
    }

    // == Remote Tier ==
    async fn remote_get(&self, key: &str) -> Option<Value> {
        let store = self.remote.as_ref()?;

        let bytes = match store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.stats.record_miss(Tier::Networked);
                return None;
            }
            Err(e) => {
                warn!("Remote get failed for {}: {}", key, e);
                self.stats.record_remote_error();
                return None;
            }
        };

        match StoredEntry::decode(&bytes) {
            Ok(entry) if entry.is_fresh(self.local.clock().now_ms()) => {
                debug!("Remote cache hit: {}", key);
                self.stats.record_hit(Tier::Networked);
                Some(entry.value)
            }
            Ok(_) => {
                debug!("Remote entry past its TTL: {}", key);
                self.stats.record_miss(Tier::Networked);
                None
            }
            Err(e) => {
                warn!("Remote value for {} is unreadable: {}", key, e);
                self.stats.record_remote_error();
                None
            }
        }
    }

    async fn remote_set(&self, key: &str, value: Value, ttl: Duration) -> bool {
        let Some(store) = &self.remote else {
            return false;
        };

        let entry = StoredEntry::new(value, self.local.clock().now_ms(), ttl.as_millis() as u64);
        let bytes = match entry.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cannot encode {} for remote tier: {}", key, e);
                self.stats.record_remote_error();
                return false;
            }
        };

        match store.set(key, &bytes, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Remote set failed for {}: {}", key, e);
                self.stats.record_remote_error();
                false
            }
        }
    }
}
