//! Shared file administration commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use toolbox_core::error::AppError;
use toolbox_service::share::ShareMeta;

use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// List every stored file
    List,
    /// Remove one file now, whether or not it has expired
    Purge {
        /// Handle returned at upload
        handle: String,
    },
    /// Remove every file whose retention window has elapsed
    Sweep,
}

/// Shared file display row
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Handle
    handle: String,
    /// Original filename
    filename: String,
    /// Size
    size: String,
    /// Upload time
    created_at: String,
    /// Expiry time
    expires_at: String,
    /// Expired already
    expired: String,
}

impl ShareRow {
    fn new(meta: &ShareMeta, now: DateTime<Utc>) -> Self {
        Self {
            handle: meta.handle.to_string(),
            filename: meta.original_name.clone(),
            size: format_bytes(meta.size_bytes),
            created_at: meta.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            expires_at: meta.expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            expired: if meta.is_expired_at(now) { "yes" } else { "no" }.to_string(),
        }
    }
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    match &args.command {
        ShareCommand::List => {
            let records = store.list().await?;
            match format {
                OutputFormat::Json => output::print_list_json(&records),
                OutputFormat::Table => {
                    let now = Utc::now();
                    let rows: Vec<ShareRow> =
                        records.iter().map(|m| ShareRow::new(m, now)).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        ShareCommand::Purge { handle } => {
            if store.purge(handle).await? {
                output::print_success(&format!("Removed shared file {handle}"));
            } else {
                output::print_warning(&format!("No shared file with handle {handle}"));
            }
        }
        ShareCommand::Sweep => {
            let removed = store.sweep().await?;
            output::print_success(&format!("Removed {removed} expired file(s)"));
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
