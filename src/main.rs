//! Stashbox Server: per-user file tree store behind a JSON API.
//!
//! Main entry point that wires the crates together and starts the server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use stashbox_api::{AppState, build_app};
use stashbox_core::config::AppConfig;
use stashbox_core::error::AppError;
use stashbox_database::connection::is_memory_url;
use stashbox_database::migration::run_migrations;
use stashbox_database::{DatabasePool, MemoryNodeRepository, NodeRepository, PgNodeRepository};
use stashbox_service::FileTreeService;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `STASHBOX_ENV`
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("STASHBOX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Stashbox v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Backing store + migrations ───────────────────────
    let (repo, pool): (Arc<dyn NodeRepository>, Option<DatabasePool>) =
        if is_memory_url(&config.database.url) {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            (Arc::new(MemoryNodeRepository::new()), None)
        } else {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(pool.pool()).await?;
            }
            (Arc::new(PgNodeRepository::new(pool.pool().clone())), Some(pool))
        };

    // ── Step 2: Services ─────────────────────────────────────────
    let tree_service = Arc::new(FileTreeService::new(repo, config.tree.clone()));
    tracing::info!(
        max_depth = config.tree.max_depth,
        reveal_foreign_nodes = config.tree.reveal_foreign_nodes,
        "File tree service ready"
    );

    // ── Step 3: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), tree_service);
    let app = build_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    tracing::info!("Stashbox stopped");
    Ok(())
}

/// Resolve when Ctrl+C or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
