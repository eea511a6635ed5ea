//! Integration tests for the network diagnostic endpoints.

mod helpers;

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use helpers::{TestApp, test_config};
use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;
use toolbox_service::network::geo::NOT_IN_DATABASE;
use toolbox_service::network::{GeoLocator, GeoRecord};

#[derive(Debug)]
struct StaticLocator;

impl GeoLocator for StaticLocator {
    fn locate(&self, ip: IpAddr) -> AppResult<GeoRecord> {
        if ip.to_string() == "9.9.9.9" {
            return Err(AppError::not_found(NOT_IN_DATABASE));
        }
        Ok(GeoRecord {
            ip: ip.to_string(),
            country: Some("United States".into()),
            region: Some("California".into()),
            city: Some("Mountain View".into()),
            location: Some("37.386, -122.0838".into()),
            org: Some("GOOGLE".into()),
        })
    }
}

#[tokio::test]
async fn test_myip_reports_peer() {
    let app = TestApp::new().await;
    let response = app.get("/myip").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"ipv4": "203.0.113.7", "ipv6": null}));
}

#[tokio::test]
async fn test_myip_ignores_forwarded_headers_by_default() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .uri("/myip")
        .header("X-Forwarded-For", "2001:4860::8888")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.body["ipv4"], "203.0.113.7");
}

#[tokio::test]
async fn test_myip_trusts_forwarded_headers_when_configured() {
    let mut config = test_config();
    config.network.trust_forwarded_headers = true;
    let app = TestApp::with_config(config).await;

    let req = Request::builder()
        .uri("/myip")
        .header("X-Forwarded-For", "2001:4860::8888, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.body, json!({"ipv4": null, "ipv6": "2001:4860::8888"}));
}

#[tokio::test]
async fn test_ipcalc_ipv4() {
    let app = TestApp::new().await;
    let response = app.get("/ipcalc/192.168.1.10/24").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "prefix": "192.168.1.0/24",
            "netmask": "255.255.255.0",
            "network": "192.168.1.0",
            "broadcast": "192.168.1.255",
            "hostmin": "192.168.1.1",
            "hostmax": "192.168.1.254",
            "hosts_net": 254,
        })
    );
}

#[tokio::test]
async fn test_ipcalc_rejects_bad_input() {
    let app = TestApp::new().await;

    let response = app.get("/ipcalc/10.0.0.1/33").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.str_field("message"),
        Some("Invalid prefix length for the given IP version.")
    );

    let response = app.get("/ipcalc/10.0.0.1/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/ipcalc/not-an-ip/24").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ip_locator_without_database_is_unavailable() {
    let app = TestApp::new().await;
    let response = app.get("/ip_locator/8.8.8.8").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.str_field("error"), Some("SERVICE_UNAVAILABLE"));
}

#[tokio::test]
async fn test_ip_locator_lookups() {
    let app = TestApp::with_locator(Arc::new(StaticLocator)).await;

    let response = app.get("/ip_locator/8.8.8.8").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str_field("ip"), Some("8.8.8.8"));
    assert_eq!(response.str_field("org"), Some("GOOGLE"));

    let response = app.get("/ip_locator/192.168.1.1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.str_field("message"),
        Some("The IP address must be public.")
    );

    let response = app.get("/ip_locator/9.9.9.9").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.str_field("message"), Some(NOT_IN_DATABASE));
}

#[tokio::test]
async fn test_ssl_cert_rejects_invalid_domain() {
    let app = TestApp::new().await;
    let response = app.get("/ssl_cert/not%20a%20domain!").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str_field("message"), Some("Invalid domain name."));
}
