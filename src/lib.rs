//! Memo Cache - a two-tier TTL cache with function memoization
//!
//! Reads go to a networked key-value store first and fall back to an
//! in-process store when that tier is missing or failing. Expensive
//! computations are memoized through the same cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod tasks;

pub use api::AppState;
pub use cache::{memoize, CacheManager, MemoScope, MemoizeConfig, Memoized};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
