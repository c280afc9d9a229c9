//! In-memory pipeline storage
//!
//! Holds every pipeline in a map guarded by a single lock, so each save is
//! checked and committed atomically. Used for local development
//! (`SLUICE_STORAGE=memory`) and in tests.

use async_trait::async_trait;
use sluice_core::domain::config::{Config, RawConfig};
use sluice_core::domain::pipeline::Pipeline;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PipelineStore, SaveConfig, SavedPipeline, StoreError, StoredConfig, initial_paused};

#[derive(Debug, Clone)]
struct Entry {
    pipeline: Pipeline,
    config: Config,
    raw_config: RawConfig,
}

type Key = (String, String);

#[derive(Debug, Default)]
pub struct MemoryPipelineStore {
    pipelines: RwLock<HashMap<Key, Entry>>,
}

impl MemoryPipelineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(team: &str, name: &str) -> Key {
    (team.to_string(), name.to_string())
}

fn not_found(team: &str, name: &str) -> StoreError {
    StoreError::NotFound {
        team: team.to_string(),
        name: name.to_string(),
    }
}

#[async_trait]
impl PipelineStore for MemoryPipelineStore {
    async fn save_config(&self, req: SaveConfig<'_>) -> Result<SavedPipeline, StoreError> {
        let next = req
            .from
            .next()
            .ok_or(StoreError::Conflict { based_on: req.from })?;
        let now = chrono::Utc::now();

        let mut pipelines = self.pipelines.write().await;

        match pipelines.get_mut(&key(req.team, req.name)) {
            Some(entry) => {
                if entry.pipeline.version != req.from {
                    return Err(StoreError::Conflict { based_on: req.from });
                }

                entry.config = req.config.clone();
                entry.raw_config = req.raw_config.clone();
                entry.pipeline.version = next;
                entry.pipeline.updated_at = now;
                if let Some(paused) = req.paused.as_flag() {
                    entry.pipeline.paused = paused;
                }

                Ok(SavedPipeline {
                    pipeline: entry.pipeline.clone(),
                    created: false,
                })
            }
            None => {
                let pipeline = Pipeline {
                    id: Uuid::new_v4(),
                    team_name: req.team.to_string(),
                    name: req.name.to_string(),
                    paused: initial_paused(req.paused),
                    version: next,
                    created_at: now,
                    updated_at: now,
                };

                pipelines.insert(
                    key(req.team, req.name),
                    Entry {
                        pipeline: pipeline.clone(),
                        config: req.config.clone(),
                        raw_config: req.raw_config.clone(),
                    },
                );

                Ok(SavedPipeline {
                    pipeline,
                    created: true,
                })
            }
        }
    }

    async fn get_config(&self, team: &str, name: &str) -> Result<StoredConfig, StoreError> {
        let pipelines = self.pipelines.read().await;
        let entry = pipelines
            .get(&key(team, name))
            .ok_or_else(|| not_found(team, name))?;

        Ok(StoredConfig {
            config: entry.config.clone(),
            raw_config: entry.raw_config.clone(),
            version: entry.pipeline.version,
        })
    }

    async fn list_pipelines(&self, team: &str) -> Result<Vec<Pipeline>, StoreError> {
        let pipelines = self.pipelines.read().await;
        let mut listed: Vec<Pipeline> = pipelines
            .values()
            .filter(|entry| entry.pipeline.team_name == team)
            .map(|entry| entry.pipeline.clone())
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(listed)
    }

    async fn set_paused(
        &self,
        team: &str,
        name: &str,
        paused: bool,
    ) -> Result<Pipeline, StoreError> {
        let mut pipelines = self.pipelines.write().await;
        let entry = pipelines
            .get_mut(&key(team, name))
            .ok_or_else(|| not_found(team, name))?;

        entry.pipeline.paused = paused;
        entry.pipeline.updated_at = chrono::Utc::now();

        Ok(entry.pipeline.clone())
    }

    async fn delete_pipeline(&self, team: &str, name: &str) -> Result<(), StoreError> {
        let mut pipelines = self.pipelines.write().await;
        pipelines
            .remove(&key(team, name))
            .map(|_| ())
            .ok_or_else(|| not_found(team, name))
    }
}
