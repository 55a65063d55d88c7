//! Book Shelf - A filterable book listing service
//!
//! Serves `GET /books` from a TTL result cache in front of book storage, plus
//! uncached single-book reads and writes.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_shelf::api::create_router;
use book_shelf::storage::MemoryStorage;
use book_shelf::{spawn_sweep_task, AppState, Config};

/// Main entry point for the Book Shelf server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load book storage
/// 4. Create the list service and its cache
/// 5. Start the background cache sweep
/// 6. Start HTTP server on configured address
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_shelf=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Book Shelf server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_ttl={}s, default_limit={}, max_limit={}, address={}:{}",
        config.cache_ttl,
        config.default_limit,
        config.max_limit,
        config.server_host,
        config.server_port
    );

    let storage = match &config.books_file {
        Some(path) => MemoryStorage::from_json_file(path)
            .await
            .with_context(|| format!("loading books from {}", path.display()))?,
        None => {
            warn!("BOOKS_FILE not set, starting with an empty catalogue");
            MemoryStorage::default()
        }
    };
    info!("Book storage ready with {} books", storage.len().await);
    let storage = Arc::new(storage);

    let state = AppState::from_config(&config, storage);

    // Sweep period equals the TTL
    let sweep_handle = spawn_sweep_task(state.service.cache().clone(), config.cache_ttl);
    info!("Background cache sweep started");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.server_host.as_str(), config.server_port))
        .await
        .with_context(|| {
            format!(
                "binding {}:{}",
                config.server_host, config.server_port
            )
        })?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, stops the cache sweep and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Cache sweep task stopped");
}
