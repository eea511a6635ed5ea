//! # toolbox-api
//!
//! HTTP API layer for Toolbox built on Axum.
//!
//! Provides the network diagnostic endpoints, the file sharing endpoints,
//! health checks, middleware (CORS, request logging), error mapping and
//! the tracing subscriber setup shared by the binaries.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod telemetry;

pub use app::{build_state, run_server, shutdown_signal};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
