//! Ephemeral file sharing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retention, expiry polling and upload limits for shared files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// How long an upload stays retrievable (default 6 hours).
    #[serde(default = "default_retention")]
    pub retention_seconds: u64,
    /// Upper bound between two clock checks of an expiry task.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Remove a file right after its first successful download.
    #[serde(default)]
    pub delete_on_read: bool,
    /// Largest accepted upload (default 100 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// How long past its deadline a failing removal keeps being retried.
    #[serde(default = "default_retry_horizon")]
    pub retry_horizon_seconds: u64,
    /// Re-arm or remove persisted records when the server starts.
    #[serde(default = "default_true")]
    pub recover_on_startup: bool,
}

impl ShareConfig {
    /// Retention window as a [`Duration`].
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_seconds)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Retry horizon as a [`Duration`].
    pub fn retry_horizon(&self) -> Duration {
        Duration::from_secs(self.retry_horizon_seconds)
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            retention_seconds: default_retention(),
            poll_interval_seconds: default_poll_interval(),
            delete_on_read: false,
            max_upload_size_bytes: default_max_upload(),
            retry_horizon_seconds: default_retry_horizon(),
            recover_on_startup: true,
        }
    }
}

fn default_retention() -> u64 {
    6 * 60 * 60
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_upload() -> u64 {
    100 * 1024 * 1024
}

fn default_retry_horizon() -> u64 {
    24 * 60 * 60
}

fn default_true() -> bool {
    true
}
