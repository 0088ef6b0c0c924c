//! Lookaside - A declarative cache-aside layer
//!
//! Serves the demo service: cached user/article/comment lookups and a
//! per-cache statistics endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lookaside::api::create_router;
use lookaside::cache::CacheRegistry;
use lookaside::config::declared_caches;
use lookaside::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the registry from the declared cache table
/// 4. Start the background expiry sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookaside=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lookaside cache service");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s",
        config.server_port, config.cleanup_interval
    );

    // Build the closed set of named caches
    let registry = Arc::new(CacheRegistry::new(declared_caches()));
    info!("Cache registry initialized: {:?}", registry.cache_names());

    // Wire repositories and resolver into the application state
    let state = AppState::new(registry.clone());

    // Start background expiry sweep
    let cleanup_handle = spawn_cleanup_task(registry, config.cleanup_interval);
    info!("Background expiry sweep started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    // Abort the sweep task
    cleanup_handle.abort();
    warn!("Expiry sweep task aborted");
}
