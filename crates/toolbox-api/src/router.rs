//! Route definitions for the Toolbox HTTP API.
//!
//! Routes are mounted at the root, grouped by domain. The router receives
//! `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room left for multipart boundaries and part headers on top of the
/// largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.share.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(network_routes())
        .merge(share_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Diagnostics: client address, subnet calculator, geolocation, TLS
fn network_routes() -> Router<AppState> {
    Router::new()
        .route("/myip", get(handlers::network::my_ip))
        .route("/ipcalc/{ip}/{prefix}", get(handlers::network::ip_calc))
        .route("/ip_locator/{ip}", get(handlers::network::ip_locator))
        .route("/ssl_cert/{domain}", get(handlers::network::ssl_cert))
}

/// Ephemeral file sharing
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/sharefile", post(handlers::share::upload))
        .route("/sharefile/{uuid}", get(handlers::share::download))
}

/// Health checks
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
