//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::auth::Authenticator;
use crate::repository::PipelineStore;
use crate::service::validate::ConfigValidator;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PipelineStore>,
    pub validator: Arc<dyn ConfigValidator>,
    pub auth: Arc<dyn Authenticator>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_config_bytes: usize) -> Router {
    Router::new()
        // Pipeline endpoints
        .route("/api/v1/teams/{team}/pipelines", get(pipeline::list_pipelines))
        .route(
            "/api/v1/teams/{team}/pipelines/{pipeline}",
            delete(pipeline::delete_pipeline),
        )
        .route(
            "/api/v1/teams/{team}/pipelines/{pipeline}/pause",
            put(pipeline::pause_pipeline),
        )
        .route(
            "/api/v1/teams/{team}/pipelines/{pipeline}/unpause",
            put(pipeline::unpause_pipeline),
        )
        // Config endpoints
        .route(
            "/api/v1/teams/{team}/pipelines/{pipeline}/config",
            get(config::get_config).put(config::save_config),
        )
        // Team routes require a token for the team in the path
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_team,
        ))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_config_bytes))
        .layer(TraceLayer::new_for_http())
}
