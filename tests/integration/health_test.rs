//! Integration tests for health endpoints.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str_field("status"), Some("ok"));
    assert!(response.str_field("version").is_some());
    assert!(response.body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_health_detailed_reports_collaborators() {
    let app = TestApp::new().await;
    app.upload("pending.txt", b"x").await;

    let response = app.get("/health/detailed").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str_field("status"), Some("ok"));
    assert_eq!(response.str_field("storage"), Some("available"));
    assert_eq!(response.str_field("storage_provider"), Some("memory"));
    assert_eq!(response.body["pending_expirations"], 1);
    assert_eq!(response.body["geoip"], false);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/api/nothing-here").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
