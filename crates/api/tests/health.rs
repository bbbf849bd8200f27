//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, build_test_app_over, build_test_app_with, FailingStore};
use pitchdeck_core::catalog::DefaultCatalog;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = build_test_app();
    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
    assert!(json["version"].is_string());
    assert_eq!(json["storage"], "memory");
    assert_eq!(json["storeHealthy"], true);
}

// ---------------------------------------------------------------------------
// Test: An unreachable store reports degraded health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_is_degraded_when_store_fails() {
    let app = build_test_app_over(FailingStore);
    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["storage"], "failing");
    assert_eq!(json["storeHealthy"], false);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app();
    let response = app.get("/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Every response carries a request id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_test_app();
    let response = app.get("/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

// ---------------------------------------------------------------------------
// Test: Security headers only in production
// ---------------------------------------------------------------------------

#[tokio::test]
async fn security_headers_only_in_production() {
    let dev = build_test_app();
    let response = dev.get("/health").await;
    assert!(!response.headers().contains_key("x-frame-options"));

    let prod = build_test_app_with(DefaultCatalog::embedded().unwrap(), |config| {
        config.app_env = "production".into();
    });
    let response = prod.get("/health").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
}
