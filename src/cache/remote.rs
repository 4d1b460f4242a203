//! Networked Store Module
//!
//! Client for the remote key/value tier. Every operation is bounded by a
//! timeout and reports failure as a value; nothing here panics or blocks
//! indefinitely on a dead server.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::RedisResult;
use tracing::{info, warn};

use crate::config::RemoteConfig;
use crate::error::{CacheError, Result};

// == Remote Store Trait ==
/// Byte-oriented remote key/value store with server-side expiry.
///
/// `Ok(None)` means the key is absent; `Err` means the store could not be
/// asked. Callers decide how to degrade.
#[async_trait]
pub trait RemoteStore: fmt::Debug + Send + Sync {
    /// Fetches the raw bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Removes `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

// == Redis Store ==
/// [`RemoteStore`] backed by a Redis server over a multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    endpoint: String,
    timeout: Duration,
    decode_responses: bool,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("decode_responses", &self.decode_responses)
            .finish()
    }
}

/// Connects to the configured remote store.
///
/// Never fails: an unreachable or disabled store yields `None` and the
/// caller runs local-only.
pub async fn connect(config: &RemoteConfig) -> Option<RedisStore> {
    if !config.enabled {
        info!("Networked cache tier disabled by configuration");
        return None;
    }

    match RedisStore::try_connect(config).await {
        Ok(store) => {
            info!("Connected to networked cache tier at {}", store.endpoint);
            Some(store)
        }
        Err(e) => {
            warn!("Networked cache tier unavailable, using local cache only: {}", e);
            None
        }
    }
}

impl RedisStore {
    // == Constructor ==
    /// Opens and verifies a connection within `config.timeout`.
    pub async fn try_connect(config: &RemoteConfig) -> Result<Self> {
        let endpoint = config.url();
        let client = redis::Client::open(endpoint.as_str())
            .map_err(|e| CacheError::ConnectionUnavailable(e.to_string()))?;

        let conn = bounded(
            config.timeout,
            "CONNECT",
            client.get_multiplexed_async_connection(),
        )
        .await?;

        let store = Self {
            conn,
            endpoint,
            timeout: config.timeout,
            decode_responses: config.decode_responses,
        };

        let mut conn = store.conn.clone();
        bounded(
            store.timeout,
            "PING",
            redis::cmd("PING").query_async::<_, String>(&mut conn),
        )
        .await?;

        Ok(store)
    }

    /// The `redis://` URL this store is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let raw = bounded(
            self.timeout,
            "GET",
            redis::cmd("GET")
                .arg(key)
                .query_async::<_, Option<Vec<u8>>>(&mut conn),
        )
        .await?;

        match raw {
            Some(bytes) if self.decode_responses => String::from_utf8(bytes)
                .map(|text| Some(text.into_bytes()))
                .map_err(|e| CacheError::Decoding(format!("non-UTF-8 value for {}: {}", key, e))),
            other => Ok(other),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        // PX rejects zero; round sub-millisecond TTLs up.
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let mut conn = self.conn.clone();
        bounded(
            self.timeout,
            "SET",
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async::<_, ()>(&mut conn),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed = bounded(
            self.timeout,
            "DEL",
            redis::cmd("DEL").arg(key).query_async::<_, i64>(&mut conn),
        )
        .await?;
        Ok(removed > 0)
    }
}

/// Runs a Redis future under `timeout`, folding both failure modes into
/// `ConnectionUnavailable`.
async fn bounded<T, F>(timeout: Duration, op: &str, fut: F) -> Result<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CacheError::ConnectionUnavailable(format!("{}: {}", op, e))),
        Err(_) => Err(CacheError::ConnectionUnavailable(format!(
            "{} timed out after {:?}",
            op, timeout
        ))),
    }
}
