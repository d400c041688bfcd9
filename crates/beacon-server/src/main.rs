use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use beacon_api::{AppState, AppStateInner};
use beacon_db::Database;
use beacon_gateway::ConnectionRegistry;
use beacon_server::{ServerConfig, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    // Shared state
    let registry = ConnectionRegistry::new();
    let state: AppState = Arc::new(AppStateInner::new(db, registry.clone()));

    let shutdown = CancellationToken::new();
    let sweeper = registry.spawn_sweeper(config.sweep_interval, shutdown.clone());

    let app = build_router(state);

    let addr = config.addr()?;
    info!(
        "Beacon server listening on {} (liveness sweep every {:?})",
        addr, config.sweep_interval
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone(), registry))
        .await?;

    shutdown.cancel();
    let _ = sweeper.await;
    info!("Beacon server stopped");

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken, registry: ConnectionRegistry) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
    // Upgraded sockets outlive the HTTP layer; drop them so serve() can return
    let closed = registry.terminate_all();
    info!("Closed {} client connections", closed);
}
