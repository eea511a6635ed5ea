//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use toolbox_core::config::logging::LoggingConfig;

/// Install the global subscriber from the `[logging]` section.
///
/// `RUST_LOG` takes precedence over `logging.level`. Any format other than
/// `json` gets the human-readable pretty printer.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}
