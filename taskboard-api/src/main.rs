//! # Taskboard API Server
//!
//! Serves the task and user endpoints over HTTP.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` supported)
//! 2. Initialize tracing (text or JSON)
//! 3. Connect the selected store; on PostgreSQL, apply pending migrations
//! 4. Serve until Ctrl-C or SIGTERM, then drain connections
//!
//! ## Usage
//!
//! ```bash
//! STORE_BACKEND=memory SESSION_SECRET=... cargo run -p taskboard-api
//! ```

use anyhow::Context;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StoreBackend, StoreConfig},
};
use taskboard_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use taskboard_shared::store::Stores;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log.json);

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (stores, pool) = connect_store(&config.store).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(stores, config);
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_store(config: &StoreConfig) -> anyhow::Result<(Stores, Option<sqlx::PgPool>)> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok((Stores::memory(), None))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .clone()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = create_pool(DatabaseConfig {
                max_connections: config.max_connections,
                ..DatabaseConfig::new(url)
            })
            .await
            .context("failed to connect to PostgreSQL")?;

            run_migrations(&pool)
                .await
                .context("failed to apply migrations")?;

            Ok((Stores::postgres(pool.clone()), Some(pool)))
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM and cancels open streams
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, draining connections...");
    shutdown.cancel();
}
