//! Sluice HTTP Client
//!
//! A simple, type-safe HTTP client for the Sluice orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use sluice_client::OrchestratorClient;
//! use sluice_core::domain::pipeline::PausedState;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestratorClient::new("http://localhost:8080").with_token("secret");
//!
//!     // Fetch, then save back on top of the version we read
//!     let fetched = client.get_config("main", "deploy").await?;
//!     if let Some(config) = fetched.response.config {
//!         let saved = client
//!             .save_config("main", "deploy", &config, fetched.version, PausedState::NoChange)
//!             .await?;
//!         println!("Saved version {:?}", saved.version);
//!     }
//!     Ok(())
//! }
//! ```

mod configs;
pub mod error;
mod pipelines;

// Re-export commonly used types
pub use configs::{FetchedConfig, SavedConfig};
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use sluice_core::domain::pipeline::ConfigVersion;
use sluice_core::dto::config::CONFIG_VERSION_HEADER;

/// HTTP client for the Sluice orchestrator API
///
/// Every team-scoped endpoint needs a bearer token, set with
/// [`OrchestratorClient::with_token`].
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token sent with every request
    token: Option<String>,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Example
    /// ```
    /// use sluice_client::OrchestratorClient;
    ///
    /// let client = OrchestratorClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a pipeline, or of a path below it
    fn pipeline_url(&self, team: &str, pipeline: &str, suffix: &str) -> String {
        format!(
            "{}/api/v1/teams/{}/pipelines/{}{}",
            self.base_url, team, pipeline, suffix
        )
    }

    /// Start a request, attaching the bearer token if one is set
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Fail on an error status, turning the body into a [`ClientError`]
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_body(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await?;
        Ok(())
    }
}

/// Config version carried by a response, if any
fn response_version(response: &reqwest::Response) -> Result<Option<ConfigVersion>> {
    let Some(value) = response.headers().get(CONFIG_VERSION_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.parse::<ConfigVersion>().ok())
        .map(Some)
        .ok_or_else(|| ClientError::ParseError(format!("invalid config version {:?}", value)))
}
