//! TTL Cleanup Task
//!
//! Background task that periodically drops expired local-tier entries.
//! Reads already ignore expired entries; this only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that purges expired local entries every
/// `cleanup_interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheManager::local_only(Duration::from_secs(3600)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<CacheManager>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    // A zero interval would spin.
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting local cache purge task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.local().purge_expired();

            if removed > 0 {
                info!("Local cache purge: removed {} expired entries", removed);
            } else {
                debug!("Local cache purge: no expired entries found");
            }
        }
    })
}
