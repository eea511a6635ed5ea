//! Storage provider trait for pluggable blob backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Key within the storage provider.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Key → bytes persistence used by the ephemeral file store.
///
/// Keys live in a flat namespace and never contain path separators.
/// Implementations live in `toolbox-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object into memory.
    ///
    /// Returns an error of kind `NotFound` when the key does not exist.
    async fn read(&self, key: &str) -> AppResult<Bytes>;

    /// Write an object, replacing any existing value under the key.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// List every stored object.
    async fn list(&self) -> AppResult<Vec<StorageObjectMeta>>;

    /// Delete leftovers of writes that never completed. Returns how many.
    ///
    /// Must only run while no write is in flight.
    async fn remove_incomplete(&self) -> AppResult<usize> {
        Ok(0)
    }
}
