//! Persisted and returned shapes of a shared file.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use toolbox_core::types::ShareHandle;

/// Metadata sidecar stored next to the content under `{handle}.meta`.
///
/// Its presence is what makes a record addressable: it is written after
/// the content and removed after the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMeta {
    /// Handle of the record.
    pub handle: ShareHandle,
    /// Filename supplied by the uploader.
    pub original_name: String,
    /// Length of the content in bytes.
    pub size_bytes: u64,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Instant from which the record is no longer served.
    pub expires_at: DateTime<Utc>,
}

impl ShareMeta {
    /// Whether the record is past its retention window at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct ShareReceipt {
    /// Handle to fetch the file with.
    pub handle: ShareHandle,
    /// Filename as supplied.
    pub original_name: String,
    /// When the file stops being served.
    pub expires_at: DateTime<Utc>,
    /// Human-readable confirmation.
    pub message: String,
}

/// A file served by the store.
#[derive(Debug, Clone)]
pub struct SharedFile {
    /// Stored metadata.
    pub meta: ShareMeta,
    /// Exact uploaded bytes.
    pub content: Bytes,
}

impl SharedFile {
    /// Filename supplied by the uploader.
    pub fn original_name(&self) -> &str {
        &self.meta.original_name
    }
}

/// Confirmation message returned to uploaders.
pub fn upload_message(retention: Duration) -> String {
    format!(
        "File uploaded successfully. It will expire in {}.",
        humanize(retention)
    )
}

/// Render a duration using the largest unit that divides it evenly.
pub fn humanize(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (value, unit) = match secs {
        s if s > 0 && s % 86_400 == 0 => (s / 86_400, "day"),
        s if s > 0 && s % 3_600 == 0 => (s / 3_600, "hour"),
        s if s > 0 && s % 60 == 0 => (s / 60, "minute"),
        s => (s, "second"),
    };
    if value == 1 {
        format!("1 {unit}")
    } else {
        format!("{value} {unit}s")
    }
}
