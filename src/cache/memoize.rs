//! Memoization Module
//!
//! Wraps a function so repeated calls with equal arguments inside a TTL
//! window reuse the first result instead of invoking the function again.
//!
//! # Example
//! ```ignore
//! let cache = Arc::new(CacheManager::local_only(Duration::from_secs(3600)));
//! let add = memoize(&cache, fn_identity!(add), MemoizeConfig::from_secs(60), |(a, b): (i64, i64)| async move {
//!     a + b
//! });
//! assert_eq!(add.call((2, 3)).await, 5);
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::codec;
use super::key::CacheKey;
use super::manager::CacheManager;

// == Memo Scope ==
/// Where memoized results are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoScope {
    /// Local tier only; results are never visible to other processes.
    #[default]
    ProcessLocal,
    /// Full manager: remote-first reads, writes to both tiers.
    Shared,
}

// == Memoize Config ==
/// Per-function memoization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoizeConfig {
    /// Results older than this are recomputed
    pub ttl: Duration,
    /// Backing tier(s)
    pub scope: MemoScope,
}

impl MemoizeConfig {
    /// Process-local memoization with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            scope: MemoScope::ProcessLocal,
        }
    }

    /// Process-local memoization with a TTL in seconds.
    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    /// Switches to the shared scope.
    pub fn shared(mut self) -> Self {
        self.scope = MemoScope::Shared;
        self
    }
}

// == Memoized ==
/// A function paired with the cache that remembers its results.
///
/// The function takes its arguments as a single serializable value (a tuple
/// for positional arguments, a struct or [`CallArgs`](super::CallArgs) for
/// named ones); that value also feeds key derivation.
///
/// On a hit the function is not invoked, so any side effect it has does not
/// repeat. Only use this on functions that are safe to skip.
#[derive(Debug)]
pub struct Memoized<F> {
    identity: String,
    config: MemoizeConfig,
    cache: Arc<CacheManager>,
    func: F,
}

/// Wraps `func` under `identity` using `cache`.
pub fn memoize<F>(
    cache: &Arc<CacheManager>,
    identity: impl Into<String>,
    config: MemoizeConfig,
    func: F,
) -> Memoized<F> {
    Memoized::new(identity, config, cache.clone(), func)
}

impl<F> Memoized<F> {
    // == Constructor ==
    /// Pairs `func` with `cache`; see also [`memoize`].
    pub fn new(
        identity: impl Into<String>,
        config: MemoizeConfig,
        cache: Arc<CacheManager>,
        func: F,
    ) -> Self {
        Self {
            identity: identity.into(),
            config,
            cache,
            func,
        }
    }

    /// The identity keys are derived from.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// TTL and scope this function was memoized with.
    pub fn config(&self) -> MemoizeConfig {
        self.config
    }

    // == Call ==
    /// Returns the remembered result for `args`, or invokes the function and
    /// remembers what it returns.
    ///
    /// Arguments without a stable encoding make the call uncacheable: the
    /// function is invoked directly and nothing is stored.
    pub async fn call<A, Fut, T>(&self, args: A) -> T
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = T>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
    {
        let Some(key) = self.key_for(&args) else {
            return (self.func)(args).await;
        };

        if let Some(hit) = self.lookup(&key).await {
            return hit;
        }

        let result = (self.func)(args).await;
        self.remember(&key, &result).await;
        result
    }

    /// Like [`call`](Self::call) for fallible functions.
    ///
    /// Only `Ok` results are remembered. Errors pass through untouched and
    /// the next call tries again.
    pub async fn try_call<A, Fut, T, E>(&self, args: A) -> std::result::Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
    {
        let Some(key) = self.key_for(&args) else {
            return (self.func)(args).await;
        };

        if let Some(hit) = self.lookup(&key).await {
            return Ok(hit);
        }

        let result = (self.func)(args).await?;
        self.remember(&key, &result).await;
        Ok(result)
    }

    // == Invalidate ==
    /// Forgets the result remembered for `args`.
    pub async fn invalidate<A: Serialize + ?Sized>(&self, args: &A) -> bool {
        let Some(key) = self.key_for(args) else {
            return false;
        };
        match self.config.scope {
            MemoScope::ProcessLocal => self.cache.local().delete(key.as_str()),
            MemoScope::Shared => self.cache.invalidate(key.as_str()).await,
        }
    }

    fn key_for<A: Serialize + ?Sized>(&self, args: &A) -> Option<CacheKey> {
        match CacheKey::derive(&self.identity, args) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Calling {} uncached: {}", self.identity, e);
                None
            }
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let value = match self.config.scope {
            MemoScope::ProcessLocal => self.cache.get_local(key.as_str()),
            MemoScope::Shared => self.cache.get(key.as_str()).await,
        }?;

        match codec::from_value(value) {
            Ok(hit) => {
                debug!("Memo hit for {}", self.identity);
                Some(hit)
            }
            Err(e) => {
                warn!("Recomputing {}: cached value unreadable: {}", self.identity, e);
                None
            }
        }
    }

    async fn remember<T: Serialize>(&self, key: &CacheKey, result: &T) {
        let value = match codec::to_value(result) {
            Ok(value) => value,
            Err(e) => {
                warn!("Not remembering result of {}: {}", self.identity, e);
                return;
            }
        };

        debug!("Memo miss for {}, stored for {:?}", self.identity, self.config.ttl);
        match self.config.scope {
            MemoScope::ProcessLocal => self.cache.set_local(key.as_str(), value, self.config.ttl),
            MemoScope::Shared => self.cache.set(key.as_str(), value, self.config.ttl).await,
        }
    }
}
