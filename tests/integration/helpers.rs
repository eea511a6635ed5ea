//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use toolbox_api::AppState;
use toolbox_core::config::AppConfig;
use toolbox_service::network::GeoLocator;
use toolbox_worker::PollingScheduler;

/// Peer address every test request appears to come from.
pub const PEER: ([u8; 4], u16) = ([203, 0, 113, 7], 40123);

const BOUNDARY: &str = "toolbox-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Expiry scheduler, stopped on drop
    pub scheduler: PollingScheduler,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}

/// Configuration for tests: in-memory storage, no GeoIP databases.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = "memory".to_string();
    config.network.geoip_city_db = String::new();
    config.network.geoip_asn_db = String::new();
    config
}

impl TestApp {
    /// Create a test application with the default test configuration
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from an explicit configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let (state, scheduler) = toolbox_api::build_state(config)
            .await
            .expect("Failed to build state");
        Self::from_state(state, scheduler)
    }

    /// Create a test application whose geolocation is served by `locator`
    pub async fn with_locator(locator: Arc<dyn GeoLocator>) -> Self {
        let (state, scheduler) = toolbox_api::build_state(test_config())
            .await
            .expect("Failed to build state");
        let state = AppState {
            geo: Some(locator),
            ..state
        };
        Self::from_state(state, scheduler)
    }

    fn from_state(state: AppState, scheduler: PollingScheduler) -> Self {
        let router = toolbox_api::build_router(state.clone())
            .layer(MockConnectInfo(SocketAddr::from(PEER)));
        Self {
            router,
            state,
            scheduler,
        }
    }

    /// Send a request and return the raw response parts
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `content` as multipart field `field` with the given filename
    pub async fn upload_as(&self, field: &str, filename: &str, content: &[u8]) -> TestResponse {
        let body = multipart_body(field, filename, content);
        let req = Request::builder()
            .method("POST")
            .uri("/sharefile")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Content-Length", body.len())
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `content` as the `file` field
    pub async fn upload(&self, filename: &str, content: &[u8]) -> TestResponse {
        self.upload_as("file", filename, content).await
    }
}

/// Build a single-part multipart body.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}

impl TestResponse {
    /// String field of the JSON body
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}
