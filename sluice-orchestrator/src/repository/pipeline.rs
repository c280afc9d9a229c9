//! Pipeline Repository
//!
//! Postgres implementation of [`PipelineStore`].

use async_trait::async_trait;
use sluice_core::domain::config::{Config, RawConfig};
use sluice_core::domain::pipeline::{ConfigVersion, Pipeline};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PipelineStore, SaveConfig, SavedPipeline, StoreError, StoredConfig, initial_paused};

const PIPELINE_COLUMNS: &str = "id, team_name, name, paused, version, created_at, updated_at";

/// Pipeline storage backed by the `pipelines` table
#[derive(Debug, Clone)]
pub struct PgPipelineStore {
    pool: PgPool,
}

impl PgPipelineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgPipelineStore {
    async fn save_config(&self, req: SaveConfig<'_>) -> Result<SavedPipeline, StoreError> {
        let conflict = || StoreError::Conflict { based_on: req.from };

        // A version outside BIGINT range can never match a stored one.
        let from = i64::try_from(req.from.0).map_err(|_| conflict())?;
        let next = from.checked_add(1).ok_or_else(conflict)?;

        let config = serde_json::to_value(req.config)?;
        let now = chrono::Utc::now();

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT version FROM pipelines WHERE team_name = $1 AND name = $2 FOR UPDATE",
        )
        .bind(req.team)
        .bind(req.name)
        .fetch_optional(&mut *tx)
        .await?;

        let (row, created) = match current {
            None => {
                // ON CONFLICT covers a concurrent create that committed after our SELECT.
                let row = sqlx::query_as::<_, PipelineRow>(&format!(
                    r#"
                    INSERT INTO pipelines (
                        id, team_name, name, config, raw_config, version,
                        paused, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (team_name, name) DO NOTHING
                    RETURNING {PIPELINE_COLUMNS}
                    "#
                ))
                .bind(Uuid::new_v4())
                .bind(req.team)
                .bind(req.name)
                .bind(&config)
                .bind(req.raw_config.as_str())
                .bind(next)
                .bind(initial_paused(req.paused))
                .bind(now)
                .bind(now)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(conflict)?;

                (row, true)
            }
            Some(version) if version != from => return Err(conflict()),
            Some(_) => {
                let row = sqlx::query_as::<_, PipelineRow>(&format!(
                    r#"
                    UPDATE pipelines
                    SET config = $1, raw_config = $2, version = $3,
                        paused = COALESCE($4, paused), updated_at = $5
                    WHERE team_name = $6 AND name = $7 AND version = $8
                    RETURNING {PIPELINE_COLUMNS}
                    "#
                ))
                .bind(&config)
                .bind(req.raw_config.as_str())
                .bind(next)
                .bind(req.paused.as_flag())
                .bind(now)
                .bind(req.team)
                .bind(req.name)
                .bind(from)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(conflict)?;

                (row, false)
            }
        };

        tx.commit().await?;

        Ok(SavedPipeline {
            pipeline: row.into(),
            created,
        })
    }

    async fn get_config(&self, team: &str, name: &str) -> Result<StoredConfig, StoreError> {
        let row = sqlx::query_as::<_, ConfigRow>(
            r#"
            SELECT config, raw_config, version
            FROM pipelines
            WHERE team_name = $1 AND name = $2
            "#,
        )
        .bind(team)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            team: team.to_string(),
            name: name.to_string(),
        })?;

        let raw_config = RawConfig(row.raw_config);
        let version = stored_version(row.version);

        match serde_json::from_value::<Config>(row.config) {
            Ok(config) => Ok(StoredConfig {
                config,
                raw_config,
                version,
            }),
            Err(err) => Err(StoreError::MalformedConfig {
                detail: err.to_string(),
                raw_config,
                version,
            }),
        }
    }

    async fn list_pipelines(&self, team: &str) -> Result<Vec<Pipeline>, StoreError> {
        let rows = sqlx::query_as::<_, PipelineRow>(&format!(
            r#"
            SELECT {PIPELINE_COLUMNS}
            FROM pipelines
            WHERE team_name = $1
            ORDER BY name
            "#
        ))
        .bind(team)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn set_paused(
        &self,
        team: &str,
        name: &str,
        paused: bool,
    ) -> Result<Pipeline, StoreError> {
        let row = sqlx::query_as::<_, PipelineRow>(&format!(
            r#"
            UPDATE pipelines
            SET paused = $1, updated_at = $2
            WHERE team_name = $3 AND name = $4
            RETURNING {PIPELINE_COLUMNS}
            "#
        ))
        .bind(paused)
        .bind(chrono::Utc::now())
        .bind(team)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            team: team.to_string(),
            name: name.to_string(),
        })?;

        Ok(row.into())
    }

    async fn delete_pipeline(&self, team: &str, name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM pipelines WHERE team_name = $1 AND name = $2")
            .bind(team)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                team: team.to_string(),
                name: name.to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    team_name: String,
    name: String,
    paused: bool,
    version: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PipelineRow> for Pipeline {
    fn from(row: PipelineRow) -> Self {
        Pipeline {
            id: row.id,
            team_name: row.team_name,
            name: row.name,
            paused: row.paused,
            version: stored_version(row.version),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ConfigRow {
    config: serde_json::Value,
    raw_config: String,
    version: i64,
}

/// The table constrains versions to be non-negative
fn stored_version(version: i64) -> ConfigVersion {
    ConfigVersion(version.max(0) as u64)
}
