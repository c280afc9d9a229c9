//! Test doubles and fixtures shared by the orchestrator's unit tests

use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::json;
use sluice_core::domain::config::{
    Config, GetStep, GroupConfig, JobConfig, Params, PlanStep, PutStep, RawConfig, ResourceConfig,
    TaskConfig, TaskStep,
};
use sluice_core::domain::pipeline::{ConfigVersion, PausedState, Pipeline};
use sluice_core::domain::validation::{ConfigWarning, ValidationOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::api::auth::TokenAuthenticator;
use crate::api::{AppState, create_router};
use crate::repository::{PipelineStore, SaveConfig, SavedPipeline, StoreError, StoredConfig};
use crate::service::validate::ConfigValidator;

// =============================================================================
// Fixtures
// =============================================================================

fn params(value: serde_json::Value) -> Params {
    serde_json::from_value(value).unwrap()
}

fn nested_params() -> Params {
    params(json!({
        "some-param": "some-value",
        "nested": {
            "key": "value",
            "array": [{"key": "value"}]
        }
    }))
}

/// A config touching every part of the schema
pub fn sample_config() -> Config {
    Config {
        groups: vec![GroupConfig {
            name: "some-group".to_string(),
            jobs: vec!["job-1".to_string(), "job-2".to_string()],
            resources: vec!["resource-1".to_string(), "resource-2".to_string()],
        }],
        resources: vec![ResourceConfig {
            name: "some-resource".to_string(),
            resource_type: "some-type".to_string(),
            source: Some(params(json!({
                "source-config": "some-value",
                "nested": {
                    "key": "value",
                    "array": [{"key": "value"}]
                }
            }))),
            check_every: None,
        }],
        resource_types: vec![ResourceConfig {
            name: "custom-resource".to_string(),
            resource_type: "custom-type".to_string(),
            source: Some(params(json!({"custom": "source"}))),
            check_every: None,
        }],
        jobs: vec![JobConfig {
            name: "some-job".to_string(),
            public: true,
            serial: true,
            plan: vec![
                PlanStep::Get(GetStep {
                    get: "some-input".to_string(),
                    resource: Some("some-resource".to_string()),
                    passed: vec!["job-1".to_string(), "job-2".to_string()],
                    params: Some(nested_params()),
                }),
                PlanStep::Task(TaskStep {
                    task: "some-task".to_string(),
                    privileged: true,
                    file: Some("some/config/path.yml".to_string()),
                    config: Some(TaskConfig {
                        image: Some("some-image".to_string()),
                        ..Default::default()
                    }),
                }),
                PlanStep::Put(PutStep {
                    put: "some-output".to_string(),
                    resource: Some("some-resource".to_string()),
                    params: Some(nested_params()),
                }),
            ],
        }],
    }
}

/// Builder for `multipart/form-data` request bodies
pub struct MultipartBody {
    boundary: &'static str,
    body: String,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "sluice-test-boundary",
            body: String::new(),
        }
    }

    /// Add a file part with the given content type
    pub fn part(mut self, content_type: &str, content: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"config\"; filename=\"pipeline\"\r\n\
             Content-Type: {content_type}\r\n\r\n{content}\r\n",
            self.boundary
        ));
        self
    }

    /// Add a plain form field
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
            self.boundary
        ));
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn bytes(&self) -> Bytes {
        Bytes::from(format!("{}--{}--\r\n", self.body, self.boundary))
    }
}

// =============================================================================
// Fake Store
// =============================================================================

/// Owned copy of the arguments of one `save_config` call
#[derive(Debug, Clone)]
pub struct SaveConfigCall {
    pub team: String,
    pub name: String,
    pub config: Config,
    pub raw_config: RawConfig,
    pub from: ConfigVersion,
    pub paused: PausedState,
}

/// Store that records saves and replays scripted results
#[derive(Default)]
pub struct FakePipelineStore {
    save_calls: Mutex<Vec<SaveConfigCall>>,
    save_error: Mutex<Option<StoreError>>,
    created: Mutex<bool>,
    config_result: Mutex<Option<Result<StoredConfig, StoreError>>>,
}

impl FakePipelineStore {
    pub fn fail_save_with(&self, err: StoreError) {
        *self.save_error.lock().unwrap() = Some(err);
    }

    pub fn report_created(&self, created: bool) {
        *self.created.lock().unwrap() = created;
    }

    pub fn return_config(&self, result: Result<StoredConfig, StoreError>) {
        *self.config_result.lock().unwrap() = Some(result);
    }

    pub fn save_call_count(&self) -> usize {
        self.save_calls.lock().unwrap().len()
    }

    pub fn save_call(&self, index: usize) -> SaveConfigCall {
        self.save_calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl PipelineStore for FakePipelineStore {
    async fn save_config(&self, req: SaveConfig<'_>) -> Result<SavedPipeline, StoreError> {
        self.save_calls.lock().unwrap().push(SaveConfigCall {
            team: req.team.to_string(),
            name: req.name.to_string(),
            config: req.config.clone(),
            raw_config: req.raw_config.clone(),
            from: req.from,
            paused: req.paused,
        });

        if let Some(err) = self.save_error.lock().unwrap().take() {
            return Err(err);
        }

        let now = chrono::Utc::now();
        Ok(SavedPipeline {
            pipeline: Pipeline {
                id: Uuid::new_v4(),
                team_name: req.team.to_string(),
                name: req.name.to_string(),
                paused: req.paused.as_flag().unwrap_or(false),
                version: req.from.next().unwrap_or(req.from),
                created_at: now,
                updated_at: now,
            },
            created: *self.created.lock().unwrap(),
        })
    }

    async fn get_config(&self, team: &str, name: &str) -> Result<StoredConfig, StoreError> {
        self.config_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| {
                Err(StoreError::NotFound {
                    team: team.to_string(),
                    name: name.to_string(),
                })
            })
    }

    async fn list_pipelines(&self, _team: &str) -> Result<Vec<Pipeline>, StoreError> {
        Ok(Vec::new())
    }

    async fn set_paused(
        &self,
        team: &str,
        name: &str,
        _paused: bool,
    ) -> Result<Pipeline, StoreError> {
        Err(StoreError::NotFound {
            team: team.to_string(),
            name: name.to_string(),
        })
    }

    async fn delete_pipeline(&self, team: &str, name: &str) -> Result<(), StoreError> {
        Err(StoreError::NotFound {
            team: team.to_string(),
            name: name.to_string(),
        })
    }
}

// =============================================================================
// Fake Validator
// =============================================================================

/// Validator returning a fixed outcome
#[derive(Default)]
pub struct FakeValidator {
    outcome: ValidationOutcome,
}

impl FakeValidator {
    pub fn with_errors(errors: &[&str]) -> Self {
        Self {
            outcome: ValidationOutcome {
                errors: errors.iter().map(|e| e.to_string()).collect(),
                warnings: Vec::new(),
            },
        }
    }

    pub fn with_warnings(warnings: Vec<ConfigWarning>) -> Self {
        Self {
            outcome: ValidationOutcome {
                errors: Vec::new(),
                warnings,
            },
        }
    }
}

impl ConfigValidator for FakeValidator {
    fn validate(&self, _config: &Config) -> ValidationOutcome {
        self.outcome.clone()
    }
}

// =============================================================================
// Router
// =============================================================================

/// Team the test token authenticates as
pub const TEAM: &str = "main";

/// Bearer header value for [`TEAM`]
pub const AUTH_HEADER: &str = "Bearer main-token";

/// Router wired to the given store and validator, accepting [`AUTH_HEADER`]
pub fn router(
    store: Arc<dyn PipelineStore>,
    validator: Arc<dyn ConfigValidator>,
) -> axum::Router {
    let auth = TokenAuthenticator::new(HashMap::from([(
        "main-token".to_string(),
        TEAM.to_string(),
    )]));

    create_router(
        AppState {
            store,
            validator,
            auth: Arc::new(auth),
        },
        1024 * 1024,
    )
}

/// Collect a response body as JSON
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text
pub async fn text_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
