use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

use api::AppState;
use api::auth::TokenAuthenticator;
use config::{Config, StorageBackend};
use repository::{MemoryPipelineStore, PgPipelineStore, PipelineStore};
use service::validate::StandardValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sluice Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store: Arc<dyn PipelineStore> = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            tracing::info!("Connecting to database...");

            let pool = db::create_pool(database_url, config.db_max_connections)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Arc::new(PgPipelineStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, pipelines will not survive a restart");
            Arc::new(MemoryPipelineStore::new())
        }
    };

    let state = AppState {
        store,
        validator: Arc::new(StandardValidator),
        auth: Arc::new(TokenAuthenticator::new(config.team_tokens.clone())),
    };

    // Build router with all API endpoints
    let app = api::create_router(state, config.max_config_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
