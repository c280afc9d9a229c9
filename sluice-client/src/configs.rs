//! Config-related API endpoints

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode, header::CONTENT_TYPE};
use sluice_core::domain::config::Config;
use sluice_core::domain::pipeline::{ConfigVersion, PausedState};
use sluice_core::domain::validation::ConfigWarning;
use sluice_core::dto::config::{
    CONFIG_VERSION_HEADER, ConfigResponse, ContentKind, PAUSED_FIELD, SaveConfigResponse,
};

use crate::error::{ClientError, Result};
use crate::{OrchestratorClient, response_version};

/// Outcome of an accepted save
#[derive(Debug, Clone, PartialEq)]
pub struct SavedConfig {
    /// Whether the save created the pipeline
    pub created: bool,
    /// Version the config is now stored under, when the server reports it
    pub version: Option<ConfigVersion>,
    pub warnings: Vec<ConfigWarning>,
}

/// A config read along with the version to base the next save on
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedConfig {
    pub response: ConfigResponse,
    pub version: ConfigVersion,
}

impl OrchestratorClient {
    // =============================================================================
    // Config Management
    // =============================================================================

    /// Save a pipeline config
    ///
    /// `from` is the version the config was based on; use `ConfigVersion(0)`
    /// for a pipeline that does not exist yet. The config goes out as YAML,
    /// wrapped in a multipart form when `paused` carries an instruction.
    pub async fn save_config(
        &self,
        team: &str,
        pipeline: &str,
        config: &Config,
        from: ConfigVersion,
        paused: PausedState,
    ) -> Result<SavedConfig> {
        let request = self.save_config_request(team, pipeline, config, from, paused)?;
        let response = self.check_status(request.send().await?).await?;

        let created = response.status() == StatusCode::CREATED;
        let version = response_version(&response)?;
        let body: SaveConfigResponse = self.handle_response(response).await?;

        tracing::debug!("Saved config of {}/{} (created: {})", team, pipeline, created);

        Ok(SavedConfig {
            created,
            version,
            warnings: body.warnings,
        })
    }

    fn save_config_request(
        &self,
        team: &str,
        pipeline: &str,
        config: &Config,
        from: ConfigVersion,
        paused: PausedState,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.pipeline_url(team, pipeline, "/config");
        let yaml = serde_yaml::to_string(config)?;

        let builder = self
            .request(Method::PUT, &url)
            .header(CONFIG_VERSION_HEADER, from.to_string());

        Ok(match paused.form_value() {
            Some(value) => {
                let part = Part::text(yaml)
                    .file_name("pipeline.yml")
                    .mime_str(ContentKind::Yaml.mime())?;
                builder.multipart(Form::new().part("config", part).text(PAUSED_FIELD, value))
            }
            None => builder
                .header(CONTENT_TYPE, ContentKind::Yaml.mime())
                .body(yaml),
        })
    }

    /// Get the stored config of a pipeline
    ///
    /// A stored config that no longer decodes is not an error: the returned
    /// response has no config, explains why in `errors`, and still carries
    /// the raw text.
    pub async fn get_config(&self, team: &str, pipeline: &str) -> Result<FetchedConfig> {
        let url = self.pipeline_url(team, pipeline, "/config");
        let response = self
            .check_status(self.request(Method::GET, &url).send().await?)
            .await?;

        let version = response_version(&response)?.ok_or_else(|| {
            ClientError::ParseError(format!("response has no {} header", CONFIG_VERSION_HEADER))
        })?;
        let response: ConfigResponse = self.handle_response(response).await?;

        Ok(FetchedConfig { response, version })
    }
}
