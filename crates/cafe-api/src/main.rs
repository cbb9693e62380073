//! Main entry point for the cafe API server

use cafe_api::build_router;
use cafe_core::{Config, context_error, context_error::Result, init_logging};
use cafe_database::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_logging(&config.logging)?;
    if let Some(err) = config_error {
        warn!("Failed to load config ({}), using defaults", err);
    }

    info!("Cafe API server v{}", env!("CARGO_PKG_VERSION"));
    info!("Starting server on {}", config.bind_address());

    info!("Connecting to database...");
    let database = Database::new(&config).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        context_error!("Database connection failed: {}", e)
    })?;
    info!("Database connection established");

    info!("Running database migrations...");
    database.migrate().await.map_err(|e| {
        error!("Database migration failed: {}", e);
        context_error!("Migration failed: {}", e)
    })?;

    database.health_check().await.map_err(|e| {
        error!("Database health check failed: {}", e);
        context_error!("Database health check failed: {}", e)
    })?;
    info!("Database ready");

    let app = build_router(config.clone(), database.pool().clone())?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| context_error!("Invalid server address: {}", e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;

    info!("Serving API on http://{}", addr);
    info!("Uploads served from {}", config.storage.upload_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| context_error!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
