//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `TOOLBOX__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section, and every field
//! carries a serde default so that an empty configuration is valid.

pub mod app;
pub mod logging;
pub mod network;
pub mod share;
pub mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::network::NetworkConfig;
use self::share::ShareConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`TOOLBOX__SHARE__RETENTION_SECONDS`).
const ENV_PREFIX: &str = "TOOLBOX";

/// Longest accepted retention, poll interval or retry horizon (10 years).
pub const MAX_DURATION_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ephemeral file sharing settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Network diagnostics settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// (`config/{env}.toml`) and environment variables prefixed with
    /// `TOOLBOX__`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Load configuration from one explicit file plus environment overrides.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to read config '{}': {e}",
                    path.display()
                ))
            })?;

        Self::finish(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.share.retention_seconds == 0 {
            return Err(AppError::configuration(
                "share.retention_seconds must be greater than zero",
            ));
        }
        if self.share.retention_seconds > MAX_DURATION_SECONDS {
            return Err(AppError::configuration(format!(
                "share.retention_seconds must not exceed {MAX_DURATION_SECONDS} (10 years)"
            )));
        }
        if self.share.poll_interval_seconds == 0 {
            return Err(AppError::configuration(
                "share.poll_interval_seconds must be greater than zero",
            ));
        }
        if self.share.poll_interval_seconds > MAX_DURATION_SECONDS
            || self.share.retry_horizon_seconds > MAX_DURATION_SECONDS
        {
            return Err(AppError::configuration(format!(
                "share.poll_interval_seconds and share.retry_horizon_seconds must not exceed {MAX_DURATION_SECONDS}"
            )));
        }
        if self.share.max_upload_size_bytes == 0 {
            return Err(AppError::configuration(
                "share.max_upload_size_bytes must be greater than zero",
            ));
        }
        match self.storage.backend.as_str() {
            "local" | "memory" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage backend '{other}' (expected 'local' or 'memory')"
                )));
            }
        }
        if self.storage.backend == "local" && self.storage.local.root_path.trim().is_empty() {
            return Err(AppError::configuration(
                "storage.local.root_path must not be empty",
            ));
        }
        Ok(())
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }
}
