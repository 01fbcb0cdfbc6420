pub mod handlers;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use care_link_data::database::DatabasePool;
use care_link_domain::health;
use care_link_domain::storage::{DocumentStore, LocalDocumentStore};

use crate::config::AppConfig;
use routes::RouterConfig;
use state::AppState;

/// Open the database, prepare upload buckets and build the router
pub async fn create_application(config: &AppConfig) -> Result<Router> {
    let database = config.database.clone();
    let pool = tokio::task::spawn_blocking(move || DatabasePool::open(&database))
        .await
        .context("database initialization task failed")?
        .context("failed to open the database")?;

    LocalDocumentStore::new(config.storage.clone())
        .ensure_buckets()
        .await
        .context("failed to create upload directories")?;

    health::initialize_start_time();

    let state = AppState::new(
        pool,
        config.tokens.clone(),
        config.hasher.clone(),
        config.storage.clone(),
        config.server.environment.clone(),
    );
    info!("Application state ready");

    Ok(routes::create_router(
        state,
        RouterConfig {
            upload_dir: &config.storage.upload_dir,
            cors_origins: &config.server.cors_origins,
        },
    ))
}
