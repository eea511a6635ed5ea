//! Toolbox Server: network diagnostics and ephemeral file sharing.
//!
//! Main entry point that loads configuration, installs logging and runs
//! the HTTP server until Ctrl+C or SIGTERM.

use toolbox_core::config::AppConfig;
use toolbox_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    toolbox_api::telemetry::init_logging(&config.logging);

    if let Err(e) = toolbox_api::run_server(config, toolbox_api::shutdown_signal()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `TOOLBOX_CONFIG`, or from `config/` layered by
/// `TOOLBOX_ENV`, plus `TOOLBOX__*` environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("TOOLBOX_CONFIG") {
        Ok(path) => AppConfig::load_file(path),
        Err(_) => {
            let env = std::env::var("TOOLBOX_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}
