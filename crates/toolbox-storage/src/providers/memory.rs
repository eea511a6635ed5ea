//! In-memory storage provider backed by a `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;
use toolbox_core::traits::storage::{StorageObjectMeta, StorageProvider};

use super::validate_key;

/// In-memory storage provider. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    objects: Arc<DashMap<String, (Bytes, DateTime<Utc>)>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, key: &str) -> AppResult<Bytes> {
        validate_key(key)?;
        self.objects
            .get(key)
            .map(|entry| entry.0.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        validate_key(key)?;
        self.objects.insert(key.to_string(), (data, Utc::now()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        validate_key(key)?;
        self.objects.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        validate_key(key)?;
        Ok(self.objects.contains_key(key))
    }

    async fn list(&self) -> AppResult<Vec<StorageObjectMeta>> {
        let mut entries: Vec<StorageObjectMeta> = self
            .objects
            .iter()
            .map(|entry| StorageObjectMeta {
                key: entry.key().clone(),
                size_bytes: entry.value().0.len() as u64,
                last_modified: Some(entry.value().1),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
