//! Config API Handlers
//!
//! HTTP endpoints for saving and reading pipeline configs.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sluice_core::dto::config::{CONFIG_VERSION_HEADER, SaveConfigResponse};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::config_service;

/// PUT /api/v1/teams/{team}/pipelines/{pipeline}/config
/// Save a pipeline config
///
/// Responds 201 when the pipeline was created by this save and 200 when an
/// existing one was updated. The new version comes back in the version header.
pub async fn save_config(
    State(state): State<AppState>,
    Path((team, pipeline)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    tracing::debug!("Saving config: {}/{} ({} bytes)", team, pipeline, body.len());

    let outcome = config_service::save_config(
        state.store.as_ref(),
        state.validator.as_ref(),
        &team,
        &pipeline,
        &headers,
        body,
    )
    .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        [(CONFIG_VERSION_HEADER, outcome.pipeline.version.to_string())],
        Json(SaveConfigResponse {
            warnings: outcome.warnings,
        }),
    )
        .into_response())
}

/// GET /api/v1/teams/{team}/pipelines/{pipeline}/config
/// Get the stored config of a pipeline
pub async fn get_config(
    State(state): State<AppState>,
    Path((team, pipeline)): Path<(String, String)>,
) -> ApiResult<Response> {
    tracing::debug!("Getting config: {}/{}", team, pipeline);

    let loaded = config_service::load_config(state.store.as_ref(), &team, &pipeline).await?;

    Ok((
        [(CONFIG_VERSION_HEADER, loaded.version.to_string())],
        Json(loaded.response),
    )
        .into_response())
}
