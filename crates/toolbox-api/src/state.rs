//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use toolbox_core::config::AppConfig;
use toolbox_service::network::{CertificateInspector, GeoLocator};
use toolbox_service::share::EphemeralFileStore;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Config ──
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // ── Sharing ──
    /// Ephemeral file store behind `/sharefile`.
    pub store: EphemeralFileStore,

    // ── Network diagnostics ──
    /// Geolocation source; `None` when the GeoIP databases are unavailable.
    pub geo: Option<Arc<dyn GeoLocator>>,
    /// TLS certificate inspector behind `/ssl_cert`.
    pub tls: Arc<CertificateInspector>,

    // ── Runtime ──
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Seconds since the state was built.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
