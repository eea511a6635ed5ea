//! CLI command definitions and dispatch.

pub mod ipcalc;
pub mod serve;
pub mod share;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use toolbox_core::config::AppConfig;
use toolbox_core::error::AppError;
use toolbox_service::share::{EphemeralFileStore, StoreSettings};
use toolbox_worker::PollingScheduler;

use crate::output::OutputFormat;

/// Toolbox: network diagnostics and ephemeral file sharing
#[derive(Debug, Parser)]
#[command(name = "toolbox", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file. Without it, `config/default.toml`
    /// and `config/$TOOLBOX_ENV.toml` are merged.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Toolbox HTTP server
    Serve(serve::ServeArgs),
    /// Inspect and clean up shared files
    Share(share::ShareArgs),
    /// Compute the network containing an address
    Ipcalc(ipcalc::IpcalcArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self.config.as_deref()).await,
            Commands::Share(args) => {
                share::execute(args, self.config.as_deref(), self.format).await
            }
            Commands::Ipcalc(args) => ipcalc::execute(args, self.format),
        }
    }
}

/// Helper: load configuration from an explicit file or the default layout
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::load_file(path),
        None => {
            let env = std::env::var("TOOLBOX_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Helper: open the file store described by the configuration.
///
/// The scheduler is never started from the CLI; commands only inspect and
/// remove records.
pub async fn open_store(config: &AppConfig) -> Result<EphemeralFileStore, AppError> {
    let storage = toolbox_storage::build_provider(&config.storage).await?;
    let scheduler = PollingScheduler::from_config(&config.share);
    Ok(EphemeralFileStore::new(
        storage,
        Arc::new(scheduler),
        StoreSettings::from(&config.share),
    ))
}
