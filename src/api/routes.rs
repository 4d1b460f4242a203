//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_certificate_handler, create_request_handler, delete_certificate_handler,
    delete_handler, get_handler, health_handler, metrics_handler, refresh_metrics_handler,
    report_handler, set_handler, stats_handler, update_request_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache` - Store a JSON value
/// - `GET /cache/:key` - Retrieve a value by key
/// - `DELETE /cache/:key` - Invalidate a key in both tiers
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check
/// - `GET /metrics?days=N` - Memoized dashboard summary
/// - `POST /metrics/refresh?days=N` - Forget the remembered summary
/// - `GET /reports/:kind?from=YYYY-MM-DD&to=YYYY-MM-DD` - Cached report rows
/// - `POST /requests`, `PATCH /requests/:id` - Service requests
/// - `POST /certificates`, `DELETE /certificates/:id` - Certificates
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(set_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/metrics/refresh", post(refresh_metrics_handler))
        .route("/reports/:kind", get(report_handler))
        .route("/requests", post(create_request_handler))
        .route("/requests/:id", patch(update_request_handler))
        .route("/certificates", post(create_certificate_handler))
        .route("/certificates/:id", delete(delete_certificate_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
