//! Repository Module
//!
//! Data access layer for the orchestrator.
//!
//! Storage sits behind the [`PipelineStore`] trait so the service layer can
//! run against Postgres in production and an in-memory store in development
//! and tests. Implementations own the compare-and-swap guarantee: a save
//! commits only if the supplied version equals the stored one.

pub mod memory;
pub mod pipeline;

// Re-export for convenience
pub use memory::MemoryPipelineStore;
pub use pipeline::PgPipelineStore;

use async_trait::async_trait;
use sluice_core::domain::config::{Config, RawConfig};
use sluice_core::domain::pipeline::{ConfigVersion, PausedState, Pipeline};
use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pipeline '{team}/{name}' not found")]
    NotFound { team: String, name: String },

    /// The stored version moved on since the caller read it
    #[error(
        "pipeline config has been modified since version {based_on}; fetch the latest config and try again"
    )]
    Conflict { based_on: ConfigVersion },

    /// The stored document no longer decodes into the current schema
    #[error("{detail}")]
    MalformedConfig {
        detail: String,
        raw_config: RawConfig,
        version: ConfigVersion,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Arguments of a config save
#[derive(Debug, Clone, Copy)]
pub struct SaveConfig<'a> {
    pub team: &'a str,
    pub name: &'a str,
    pub config: &'a Config,
    pub raw_config: &'a RawConfig,
    /// Version the submitted config was based on
    pub from: ConfigVersion,
    pub paused: PausedState,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPipeline {
    pub pipeline: Pipeline,
    /// Whether the pipeline did not exist before this save
    pub created: bool,
}

/// A stored config together with its raw text and version
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConfig {
    pub config: Config,
    pub raw_config: RawConfig,
    pub version: ConfigVersion,
}

/// Durable, versioned storage of pipeline configs keyed by (team, name)
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Saves a config if `req.from` matches the stored version
    ///
    /// Creates the pipeline when it does not exist yet. New pipelines start
    /// paused unless the request explicitly unpauses them. The stored version
    /// becomes `req.from + 1`.
    async fn save_config(&self, req: SaveConfig<'_>) -> Result<SavedPipeline, StoreError>;

    /// Loads the current config of a pipeline
    ///
    /// Returns [`StoreError::MalformedConfig`] when the stored document can no
    /// longer be decoded.
    async fn get_config(&self, team: &str, name: &str) -> Result<StoredConfig, StoreError>;

    /// Lists the pipelines of a team, ordered by name
    async fn list_pipelines(&self, team: &str) -> Result<Vec<Pipeline>, StoreError>;

    /// Sets the paused flag without touching the config or its version
    async fn set_paused(&self, team: &str, name: &str, paused: bool)
    -> Result<Pipeline, StoreError>;

    /// Deletes a pipeline
    async fn delete_pipeline(&self, team: &str, name: &str) -> Result<(), StoreError>;
}

/// Paused flag a newly created pipeline starts with
pub(crate) fn initial_paused(paused: PausedState) -> bool {
    paused.as_flag().unwrap_or(true)
}
