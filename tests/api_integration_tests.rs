//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use memo_cache::{
    api::create_router,
    services::{Certificate, RecordList, RequestStatus, ServiceRequest},
    AppState, CacheManager,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = Arc::new(CacheManager::local_only(Duration::from_secs(300)));
    create_router(AppState::with_cache(cache))
}

fn create_app_with_records(
    requests: Arc<RecordList<ServiceRequest>>,
    certificates: Arc<RecordList<Certificate>>,
) -> Router {
    let cache = Arc::new(CacheManager::local_only(Duration::from_secs(300)));
    create_router(AppState::new(cache, requests, certificates))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/cache", r#"{"key":"test_key","value":{"a":1}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["ttl"], 300);
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/cache", r#"{"key":"ttl_key","value":"v","ttl":60}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ttl"], 60);
}

#[tokio::test]
async fn test_set_endpoint_rejects_zero_ttl() {
    let app = create_test_app();

    let response = app
        .oneshot(put_json("/cache", r#"{"key":"k","value":"v","ttl":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_after_set_served_locally() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_json("/cache", r#"{"key":"k","value":[1,2,3]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/cache/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], serde_json::json!([1, 2, 3]));
    assert_eq!(json["tier"], "local");
}

#[tokio::test]
async fn test_get_missing_key() {
    let app = create_test_app();

    let response = app.oneshot(get("/cache/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/cache", r#"{"key":"gone","value":true}"#))
        .await
        .unwrap();

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri("/cache/gone")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/cache/gone")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_track_hits_and_misses() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_json("/cache", r#"{"key":"s","value":1}"#))
        .await
        .unwrap();
    app.clone().oneshot(get("/cache/s")).await.unwrap();
    app.clone().oneshot(get("/cache/nope")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["local_hits"], 1);
    assert_eq!(json["local_misses"], 1);
    assert_eq!(json["local_entries"], 1);
    assert_eq!(json["remote_available"], false);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_reports_local_only() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["cache_mode"], "local_only");
    assert!(json.get("timestamp").is_some());
}

// == METRICS / REPORT Endpoint Tests ==

#[tokio::test]
async fn test_metrics_memoized_for_the_hour() {
    let requests = Arc::new(RecordList::<ServiceRequest>::new());
    let certificates = Arc::new(RecordList::<Certificate>::new());
    requests.add(ServiceRequest::new("r1", "acme")).unwrap();
    let app = create_app_with_records(requests.clone(), certificates);

    let response = app.clone().oneshot(get("/metrics?days=7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_to_json(response.into_body()).await;
    assert_eq!(first["total_requests"], 1);
    assert_eq!(first["pending_requests"], 1);

    // New data is not visible until the remembered summary expires.
    requests.add(ServiceRequest::new("r2", "acme")).unwrap();
    let response = app.oneshot(get("/metrics?days=7")).await.unwrap();
    let second = body_to_json(response.into_body()).await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_report_endpoint_lists_rows() {
    let requests = Arc::new(RecordList::<ServiceRequest>::new());
    requests.add(ServiceRequest::new("r1", "acme")).unwrap();
    requests.update("r1", |r| r.status = RequestStatus::Completed);
    let app = create_app_with_records(requests, Arc::new(RecordList::new()));

    let today = Utc::now().date_naive();
    let uri = format!("/reports/requests?from={}&to={}", today, today);
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "r1");
    assert_eq!(rows[0]["client"], "acme");
}

#[tokio::test]
async fn test_report_endpoint_rejects_reversed_range() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/reports/certificates?from=2024-02-01&to=2024-01-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_window_beyond_calendar_range() {
    let requests = Arc::new(RecordList::<ServiceRequest>::new());
    requests.add(ServiceRequest::new("r1", "acme")).unwrap();
    let app = create_app_with_records(requests, Arc::new(RecordList::new()));

    let response = app
        .oneshot(get(&format!("/metrics?days={}", u32::MAX)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_requests"], 1);
}

// == RECORD Endpoint Tests ==

#[tokio::test]
async fn test_recorded_requests_reach_metrics_after_refresh() {
    let app = create_test_app();

    let response = app.clone().oneshot(get("/metrics?days=7")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_requests"], 0);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/requests", r#"{"id":"r1","client":"acme"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(send_json("PATCH", "/requests/r1", r#"{"status":"completed"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "completed");

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/certificates",
            r#"{"id":"c1","client":"acme","kind":"tls"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Still the remembered summary.
    let response = app.clone().oneshot(get("/metrics?days=7")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_requests"], 0);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/metrics/refresh?days=7", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["refreshed"], true);

    let response = app.oneshot(get("/metrics?days=7")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_requests"], 1);
    assert_eq!(json["pending_requests"], 0);
    assert_eq!(json["total_certificates"], 1);
    assert_eq!(json["success_rate"], 100.0);
}

#[tokio::test]
async fn test_record_endpoints_reject_bad_input() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(send_json("POST", "/requests", r#"{"id":"","client":"acme"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(send_json("PATCH", "/requests/missing", r#"{"status":"rejected"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/certificates/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
