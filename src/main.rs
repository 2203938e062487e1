//! Task manager HTTP service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use eyre::WrapErr;
use mockable::DefaultClock;
use tokio::{net::TcpListener, signal};

use taskmgr::{
    api::{self, AppState, BearerSecret},
    config::Configuration,
    task::adapters::postgres::{
        PostgresTaskRepositoryFactory, apply_schema, build_pool, seed_tasks,
    },
    telemetry,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let dotenv = dotenvy::dotenv();
    telemetry::init().wrap_err("failed to initialise logging")?;
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).wrap_err("failed to read .env file"),
    }

    let config = Configuration::from_env().wrap_err("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");

    let database = config.database();
    let pool = build_pool(database.url(), database.pool_size())
        .await
        .wrap_err("failed to connect to database")?;
    apply_schema(&pool)
        .await
        .wrap_err("failed to apply database schema")?;
    if config.seed_tasks() {
        seed_tasks(&pool)
            .await
            .wrap_err("failed to insert starter tasks")?;
        tracing::info!("starter tasks present");
    }
    tracing::info!(pool_size = database.pool_size(), "database ready");

    let repositories = PostgresTaskRepositoryFactory::new(pool, Arc::new(DefaultClock));
    let state = AppState::new(Arc::new(repositories), BearerSecret::new(config.bearer()));
    let application = api::router(state);

    let address = config.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("failed to bind {address}"))?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .wrap_err("server error")?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
