//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheManager;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, MetricsParams, NewCertificate,
    NewServiceRequest, RefreshResponse, ReportParams, ReportPath, SetRequest, SetResponse,
    StatsResponse, StatusUpdate,
};
use crate::services::{
    Certificate, DashboardMetrics, MetricsService, RecordList, ReportRow, ServiceRequest,
};

/// Window used by GET /metrics when `days` is not given
const DEFAULT_METRICS_DAYS: u32 = 7;

/// Application state shared across all handlers.
///
/// Holds the process-wide cache manager, the record lists and the
/// services built on them.
#[derive(Clone)]
pub struct AppState {
    /// Two-tier cache
    pub cache: Arc<CacheManager>,
    /// Dashboard metrics and reports
    pub metrics: Arc<MetricsService>,
    pub requests: Arc<RecordList<ServiceRequest>>,
    pub certificates: Arc<RecordList<Certificate>>,
}

impl AppState {
    /// Creates a new AppState, wiring the metrics service to `cache` and the
    /// given record lists.
    pub fn new(
        cache: Arc<CacheManager>,
        requests: Arc<RecordList<ServiceRequest>>,
        certificates: Arc<RecordList<Certificate>>,
    ) -> Self {
        let metrics = MetricsService::new(cache.clone(), requests.clone(), certificates.clone());
        Self {
            cache,
            metrics: Arc::new(metrics),
            requests,
            certificates,
        }
    }

    /// Creates a new AppState over the given cache with empty record lists.
    pub fn with_cache(cache: Arc<CacheManager>) -> Self {
        Self::new(
            cache,
            Arc::new(RecordList::new()),
            Arc::new(RecordList::new()),
        )
    }
}

/// Handler for PUT /cache
///
/// Stores a JSON value in both tiers with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req
        .ttl
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.cache.default_ttl());
    state.cache.set(&req.key, req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key, ttl.as_secs())))
}

/// Handler for GET /cache/:key
///
/// Retrieves a value, remote tier first.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let (value, tier) = state
        .cache
        .get_with_tier(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value, tier)))
}

/// Handler for DELETE /cache/:key
///
/// Invalidates a key in both tiers.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.invalidate(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// Reports healthy whether or not the networked tier is connected.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_remote_available()))
}

/// Handler for GET /metrics
///
/// Returns the memoized dashboard summary.
pub async fn metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<MetricsParams>,
) -> Json<DashboardMetrics> {
    let days = params.days.unwrap_or(DEFAULT_METRICS_DAYS);
    Json(state.metrics.dashboard(days).await)
}

/// Handler for POST /metrics/refresh
///
/// Drops the remembered summary so the next GET /metrics recomputes it.
pub async fn refresh_metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<MetricsParams>,
) -> Json<RefreshResponse> {
    let days = params.days.unwrap_or(DEFAULT_METRICS_DAYS);
    let refreshed = state.metrics.refresh_dashboard(days).await;
    Json(RefreshResponse { days, refreshed })
}

/// Handler for GET /reports/:kind
///
/// Returns report rows for an inclusive date range.
pub async fn report_handler(
    State(state): State<AppState>,
    Path(path): Path<ReportPath>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<ReportRow>>> {
    let rows = state
        .metrics
        .report(path.kind, params.from, params.to)
        .await?;
    Ok(Json(rows))
}

/// Handler for POST /requests
///
/// Records a new pending service request.
pub async fn create_request_handler(
    State(state): State<AppState>,
    Json(body): Json<NewServiceRequest>,
) -> Result<(StatusCode, Json<ServiceRequest>)> {
    if let Some(error_msg) = body.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let request = ServiceRequest::new(body.id, body.client);
    state.requests.add(request.clone())?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Handler for PATCH /requests/:id
///
/// Moves a service request to a new status.
pub async fn update_request_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<ServiceRequest>> {
    if !state.requests.update(&id, |r| r.status = body.status) {
        return Err(CacheError::NotFound(id));
    }

    state
        .requests
        .get(&id)
        .map(Json)
        .ok_or(CacheError::NotFound(id))
}

/// Handler for POST /certificates
pub async fn create_certificate_handler(
    State(state): State<AppState>,
    Json(body): Json<NewCertificate>,
) -> Result<(StatusCode, Json<Certificate>)> {
    if let Some(error_msg) = body.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let certificate = Certificate::new(body.id, body.client, body.kind);
    state.certificates.add(certificate.clone())?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

/// Handler for DELETE /certificates/:id
pub async fn delete_certificate_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.certificates.remove(&id) {
        return Err(CacheError::NotFound(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
