//! Builds the configured storage provider.

use std::sync::Arc;

use toolbox_core::config::storage::StorageConfig;
use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;
use toolbox_core::traits::storage::StorageProvider;

use crate::providers::local::LocalStorageProvider;
use crate::providers::memory::MemoryStorageProvider;

/// Instantiate the backend named by `storage.backend`.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.backend.as_str() {
        "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
        "memory" => Arc::new(MemoryStorageProvider::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage backend '{other}'"
            )));
        }
    };
    tracing::info!(backend = provider.provider_type(), "Storage provider ready");
    Ok(provider)
}
