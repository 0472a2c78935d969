//! Online shop backend: accounts, catalog, carts and orders over a JSON HTTP API.

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod services;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tracing::info;

use crate::api::create_api_router;
use crate::config::Config;
use crate::entities::{seed_admin, setup_schema};
use crate::middleware::auth::TokenKeys;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens the connection pool. An in-memory SQLite store lives only as long as
/// its connection, so it gets exactly one that is never recycled early.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());

    if config.database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(config.db_max_connections);
    }
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Connects, creates the schema, seeds the admin account and wires the routes.
pub async fn build_app(config: &Config) -> Result<Router, DbErr> {
    let db = connect(config).await?;
    setup_schema(&db).await?;

    if let Some(seed) = &config.admin {
        seed_admin(&db, seed).await?;
    }

    let keys = TokenKeys::new(&config.jwt_secret, config.token_ttl_seconds);
    Ok(create_api_router(Arc::new(db), Arc::new(keys)))
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServeError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn serve(config: Config) -> Result<(), ServeError> {
    let app = build_app(&config).await?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "starting shop backend");

    serve_on(listener, app, shutdown_signal()).await?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install SIGINT handler");
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
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, starting graceful shutdown"),
        () = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}
