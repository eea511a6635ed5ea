//! Application builder: wires collaborators, state and router, then serves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use toolbox_core::config::AppConfig;
use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;
use toolbox_service::network::{CertificateInspector, MaxMindLocator};
use toolbox_service::share::{EphemeralFileStore, StoreSettings};
use toolbox_worker::PollingScheduler;

use crate::router::build_router;
use crate::state::AppState;

/// Build the shared state from configuration.
///
/// The returned scheduler drives every expiry task; stop it with
/// [`PollingScheduler::shutdown`] when the server goes away.
pub async fn build_state(config: AppConfig) -> AppResult<(AppState, PollingScheduler)> {
    // ── Step 1: Storage provider ─────────────────────────────────
    let storage = toolbox_storage::build_provider(&config.storage).await?;

    // ── Step 2: Expiry scheduler ─────────────────────────────────
    let scheduler = PollingScheduler::from_config(&config.share);

    // ── Step 3: File store + startup recovery ────────────────────
    let store = EphemeralFileStore::new(
        storage,
        Arc::new(scheduler.clone()),
        StoreSettings::from(&config.share),
    );
    if config.share.recover_on_startup {
        let report = store.recover().await?;
        tracing::info!(
            rescheduled = report.rescheduled,
            expired = report.expired,
            orphans_removed = report.orphans_removed,
            incomplete_removed = report.incomplete_removed,
            "Recovered shared files from storage"
        );
    }

    // ── Step 4: Network diagnostics ──────────────────────────────
    let geo = MaxMindLocator::from_config(&config.network);
    let tls = Arc::new(CertificateInspector::from_config(&config.network)?);

    let state = AppState {
        config: Arc::new(config),
        store,
        geo,
        tls,
        started_at: Instant::now(),
    };
    Ok((state, scheduler))
}

/// Runs the Toolbox server until `shutdown` resolves.
///
/// In-flight requests get `server.shutdown_grace_seconds` to finish; pending
/// expiry tasks stop immediately and are picked up again by the next
/// startup recovery.
pub async fn run_server(
    config: AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> AppResult<()> {
    tracing::info!("Starting Toolbox v{}", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let (state, scheduler) = build_state(config).await?;
    let app = build_router(state);

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    scheduler.shutdown_on(shutdown_rx.clone());

    // ── Step 6: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Toolbox server listening on {}", addr);

    let mut server_rx = shutdown_rx;
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = server_rx.wait_for(|stop| *stop).await;
    })
    .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|e| AppError::internal(format!("Server error: {e}")));
        }
        _ = shutdown => {
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_tx.send_replace(true);
        }
    }

    // ── Step 7: Drain in-flight requests ─────────────────────────
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|e| AppError::internal(format!("Server error: {e}")))?,
        Err(_) => tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Graceful shutdown timed out, dropping open connections"
        ),
    }

    tracing::info!("Toolbox server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
