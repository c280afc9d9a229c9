//! Pipeline-related API endpoints

use reqwest::Method;
use sluice_core::domain::pipeline::Pipeline;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// List the pipelines of a team, ordered by name
    ///
    /// # Example
    /// ```no_run
    /// # use sluice_client::OrchestratorClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = OrchestratorClient::new("http://localhost:8080").with_token("secret");
    /// for pipeline in client.list_pipelines("main").await? {
    ///     println!("{} (paused: {})", pipeline.name, pipeline.paused);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_pipelines(&self, team: &str) -> Result<Vec<Pipeline>> {
        let url = format!("{}/api/v1/teams/{}/pipelines", self.base_url, team);
        let response = self.request(Method::GET, &url).send().await?;

        self.handle_response(response).await
    }

    /// Pause a pipeline
    pub async fn pause_pipeline(&self, team: &str, pipeline: &str) -> Result<Pipeline> {
        let url = self.pipeline_url(team, pipeline, "/pause");
        let response = self.request(Method::PUT, &url).send().await?;

        self.handle_response(response).await
    }

    /// Unpause a pipeline
    pub async fn unpause_pipeline(&self, team: &str, pipeline: &str) -> Result<Pipeline> {
        let url = self.pipeline_url(team, pipeline, "/unpause");
        let response = self.request(Method::PUT, &url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, team: &str, pipeline: &str) -> Result<()> {
        let url = self.pipeline_url(team, pipeline, "");
        let response = self.request(Method::DELETE, &url).send().await?;

        self.handle_empty_response(response).await
    }
}
