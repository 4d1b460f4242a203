//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Local cache purge: drops expired local-tier entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
