//! API Module
//!
//! HTTP handlers and routing for the dashboard cache service.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON value
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Invalidate a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Dashboard metrics
//! - `POST /metrics/refresh` - Recompute dashboard metrics on next read
//! - `GET /reports/:kind` - Report rows for a date range
//! - `POST /requests`, `PATCH /requests/:id` - Record and update service requests
//! - `POST /certificates`, `DELETE /certificates/:id` - Record and remove certificates

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
