//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker spawning, and Axum server lifecycle.

use crate::application::services::UrlService;
use crate::config::Config;
use crate::domain::access_worker::run_access_worker;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::PgUrlRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::SeededCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Time allowed for queued access increments to land after the listener stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Background access worker
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the listener stops accepting connections, in-flight
/// requests complete, and the access worker drains its queue before the
/// function returns.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!(database = %config.database_name, "Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let (access_tx, access_rx) = mpsc::channel(config.access_queue_capacity);

    let repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(Arc::new(pool)));
    let worker = tokio::spawn(run_access_worker(
        access_rx,
        repository.clone(),
        config.access_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.access_worker_concurrency,
        "Access worker started"
    );

    let mut service = UrlService::new(repository, access_tx)
        .with_max_attempts(config.code_max_attempts)
        .with_store_timeout(config.store_timeout());
    if let Some(seed) = config.code_seed {
        service = service.with_generator(Arc::new(SeededCodeGenerator::new(seed)));
    }

    let state = AppState::new(Arc::new(service));
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last sender; the worker now sees a closed channel.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Access queue drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Access worker panicked"),
        Err(_) => tracing::warn!(
            timeout_secs = WORKER_DRAIN_TIMEOUT.as_secs(),
            "Access worker did not drain in time, pending increments dropped"
        ),
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Builds the connection pool, selecting the configured database name.
async fn connect_pool(config: &Config) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .database(&config.database_name);

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Resolves when the process receives Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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

    tracing::info!("Shutdown signal received, stopping server");
}
