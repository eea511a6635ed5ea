//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use toolbox_service::share::ShareReceipt;

/// Body returned by `POST /sharefile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Handle to download the file with.
    pub uuid: String,
    /// Filename as uploaded.
    pub original_filename: String,
    /// Confirmation including the retention window.
    pub message: String,
    /// When the file stops being served.
    pub expires_at: DateTime<Utc>,
}

impl From<ShareReceipt> for UploadResponse {
    fn from(receipt: ShareReceipt) -> Self {
        Self {
            uuid: receipt.handle.to_string(),
            original_filename: receipt.original_name,
            message: receipt.message,
            expires_at: receipt.expires_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Storage backend name.
    pub storage_provider: String,
    /// `"available"` or `"unavailable"`.
    pub storage: String,
    /// Expiry tasks still waiting for their deadline.
    pub pending_expirations: usize,
    /// Whether the GeoIP databases are loaded.
    pub geoip: bool,
}
