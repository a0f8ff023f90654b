use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use qr_inventory::config::Config;
use qr_inventory::db::{create_pool, PgItemRepository};
use qr_inventory::routes::{self, AppState, HttpOptions};
use qr_inventory::services::{ItemsService, UuidCodeGenerator};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qr_inventory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("DATABASE_URL must be set")?;

    tracing::info!("Starting qr-inventory server...");
    tracing::info!("Connecting to database...");

    let pool = create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(
        "Database connection established: max_connections={}",
        config.db_max_connections
    );

    let repository = Arc::new(PgItemRepository::new(pool.clone()));
    let items_service = ItemsService::new(
        repository,
        Arc::new(UuidCodeGenerator),
        config.code_max_attempts,
    );

    let options = HttpOptions::from_config(&config);
    let app = routes::router(AppState::new(items_service), &options);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Serving frontend from {}", config.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, closing database pool");
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
