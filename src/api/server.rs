use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::logging::{init_tracing, server_filter};
use crate::core::{
    AppConfig,
    db::{async_db, migrate_db},
};
use crate::jobs::{PurgeExpiredEvents, spawn_periodic_job};
use crate::schedule::SqliteStore;

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("Shutting down");
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    init_tracing(&server_filter());

    fs::create_dir_all(&config.db_path)
        .with_context(|| format!("Failed to create db directory {}", config.db_path))?;
    let db = async_db(&config.db_path)
        .await
        .context("Failed to connect to async db")?;
    db.call(|conn| {
        migrate_db(conn)?;
        Ok(())
    })
    .await
    .context("DB migration failed")?;

    let store = SqliteStore::new(db);
    let app_state = AppState::new(store.clone(), config.clone());
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    // Background jobs each run in their own tokio task
    spawn_periodic_job(config, store, PurgeExpiredEvents);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
