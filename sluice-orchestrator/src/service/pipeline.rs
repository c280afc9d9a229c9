//! Pipeline Service
//!
//! Business logic for pipeline management outside of config saves.

use sluice_core::domain::pipeline::Pipeline;

use crate::repository::{PipelineStore, StoreError};

pub type Result<T> = std::result::Result<T, StoreError>;

/// List the pipelines of a team
pub async fn list_pipelines(store: &dyn PipelineStore, team: &str) -> Result<Vec<Pipeline>> {
    store.list_pipelines(team).await
}

/// Pause a pipeline
pub async fn pause_pipeline(store: &dyn PipelineStore, team: &str, name: &str) -> Result<Pipeline> {
    let pipeline = store.set_paused(team, name, true).await?;
    tracing::info!("Pipeline paused: {}/{}", team, name);
    Ok(pipeline)
}

/// Unpause a pipeline
pub async fn unpause_pipeline(
    store: &dyn PipelineStore,
    team: &str,
    name: &str,
) -> Result<Pipeline> {
    let pipeline = store.set_paused(team, name, false).await?;
    tracing::info!("Pipeline unpaused: {}/{}", team, name);
    Ok(pipeline)
}

/// Delete a pipeline
pub async fn delete_pipeline(store: &dyn PipelineStore, team: &str, name: &str) -> Result<()> {
    store.delete_pipeline(team, name).await?;
    tracing::info!("Pipeline deleted: {}/{}", team, name);
    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

/// Check a pipeline name taken from the request path
pub fn validate_pipeline_name(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("pipeline name cannot be empty".to_string());
    }

    if name.len() > 255 {
        return Err("pipeline name is too long (max 255 characters)".to_string());
    }

    Ok(())
}
