//! Integration tests for the liveness, readiness and metrics endpoints.
//!
//! Apart from the unreachable-database case these need PostgreSQL. Run with:
//! TEST_DATABASE_URL=postgres://... cargo test -p menu-service --test health_check

mod common;

use axum::http::StatusCode;
use common::{get, happy_provider, offline_router, send, spawn_app};
use std::sync::Arc;

#[tokio::test]
async fn health_check_reports_unreachable_database() {
    let router = offline_router(Arc::new(happy_provider()), 100);

    let (status, body) = send(&router, get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");

    let (status, _) = send(&router, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_check_returns_ok() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "menu-service");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    let response = app
        .client
        .get(app.url("/ready"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    let response = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    // Touch the database so the query histogram has a sample
    app.client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    let response = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let text = response.text().await.expect("Failed to read body");
    assert!(text.contains("menu_db_query_duration_seconds"));
    assert!(text.contains("http_requests_total"));
}
