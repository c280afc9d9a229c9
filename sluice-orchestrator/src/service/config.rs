//! Config Service
//!
//! Saving and loading pipeline configs.
//!
//! A save runs version guard, decode, semantic validation and storage in
//! that order and stops at the first failure. Nothing before the storage
//! call has side effects, so a rejected submission never writes anything.

use axum::body::Bytes;
use axum::http::{HeaderMap, header::CONTENT_TYPE};
use sluice_core::domain::pipeline::{ConfigVersion, PausedState, Pipeline};
use sluice_core::domain::validation::ConfigWarning;
use sluice_core::dto::config::{ConfigResponse, ContentKind, MULTIPART_FORM_DATA, media_type};
use thiserror::Error;

use crate::repository::{PipelineStore, SaveConfig, StoreError};
use crate::service::decode::{self, DecodeError};
use crate::service::multipart::{self, MultipartError};
use crate::service::pipeline_service;
use crate::service::validate::ConfigValidator;
use crate::service::version::{self, VersionError};

/// Service error type
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("unsupported content type '{0}'")]
    UnsupportedContentKind(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("config is invalid: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("failed to save config: {0}")]
    Storage(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, SaveError>;

/// Result of an accepted save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub pipeline: Pipeline,
    pub created: bool,
    pub warnings: Vec<ConfigWarning>,
}

/// Result of a config read, including reads of a config that no longer decodes
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub response: ConfigResponse,
    pub version: ConfigVersion,
}

/// Save a submitted config for `team`/`pipeline`
///
/// `headers` supply the config version and the content type; `body` is the
/// document itself or a multipart envelope around it.
pub async fn save_config(
    store: &dyn PipelineStore,
    validator: &dyn ConfigValidator,
    team: &str,
    pipeline: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<SaveOutcome> {
    let from = version::config_version(headers)?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let (decoded, paused) = if media_type(content_type) == MULTIPART_FORM_DATA {
        let part = multipart::split(content_type, body).await?;
        let decoded = decode::decode(&part.body, part.kind)?;
        (decoded, part.paused()?)
    } else {
        let kind = ContentKind::from_content_type(content_type)
            .ok_or_else(|| SaveError::UnsupportedContentKind(content_type.to_string()))?;
        (decode::decode(&body, kind)?, PausedState::NoChange)
    };

    let mut outcome = validator.validate(&decoded.config);
    if let Err(message) = pipeline_service::validate_pipeline_name(pipeline) {
        outcome.errors.insert(0, message);
    }
    if !outcome.is_valid() {
        tracing::warn!("Rejected config for {}/{}: {:?}", team, pipeline, outcome.errors);
        return Err(SaveError::ValidationFailed(outcome.errors));
    }

    let saved = store
        .save_config(SaveConfig {
            team,
            name: pipeline,
            config: &decoded.config,
            raw_config: &decoded.raw_config,
            from,
            paused,
        })
        .await
        .map_err(SaveError::Storage)?;

    tracing::info!(
        "Config saved: {}/{} (version {}, created: {})",
        team,
        pipeline,
        saved.pipeline.version,
        saved.created
    );

    Ok(SaveOutcome {
        pipeline: saved.pipeline,
        created: saved.created,
        warnings: outcome.warnings,
    })
}

/// Load the stored config of `team`/`pipeline`
///
/// A stored document that no longer decodes is still a successful load: the
/// response carries no config, an error describing why, and the raw text.
pub async fn load_config(
    store: &dyn PipelineStore,
    team: &str,
    pipeline: &str,
) -> std::result::Result<LoadedConfig, StoreError> {
    match store.get_config(team, pipeline).await {
        Ok(stored) => Ok(LoadedConfig {
            response: ConfigResponse {
                config: Some(stored.config),
                raw_config: stored.raw_config,
                errors: None,
            },
            version: stored.version,
        }),
        Err(StoreError::MalformedConfig {
            detail,
            raw_config,
            version,
        }) => {
            tracing::warn!("Stored config of {}/{} is malformed: {}", team, pipeline, detail);

            Ok(LoadedConfig {
                response: ConfigResponse {
                    config: None,
                    raw_config,
                    errors: Some(vec![format!("malformed config: {detail}")]),
                },
                version,
            })
        }
        Err(err) => Err(err),
    }
}
