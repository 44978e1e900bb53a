//! Book Catalog Server
//!
//! REST API for the books of a library catalog.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_catalog_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{BooksRepository, MemoryBooksRepository, PgBooksRepository},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("book_catalog_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Book Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    // The pool is kept here so it can be closed once the server stops
    let (repository, pool) = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");

            let repository: Arc<dyn BooksRepository> = Arc::new(PgBooksRepository::new(pool.clone()));
            (repository, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory book storage; data is lost on shutdown");
            let repository: Arc<dyn BooksRepository> = Arc::new(MemoryBooksRepository::new());
            (repository, None)
        }
    };

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address: {}", config.server.host))?,
        config.server.port,
    );

    let state = AppState::new(config, Services::new(repository));
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
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

    tracing::info!("Shutdown signal received");
}
