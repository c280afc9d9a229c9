//! Error types for the Sluice client

use sluice_core::dto::config::ErrorsResponse;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Sluice client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Config could not be encoded for submission
    #[error("Failed to encode config: {0}")]
    EncodeError(#[from] serde_yaml::Error),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body
    ///
    /// Rejections carry a JSON `errors` list, which is joined into one
    /// message; any other body is used as is.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorsResponse>(body) {
            Ok(response) if !response.errors.is_empty() => {
                Self::api_error(status, response.errors.join("; "))
            }
            _ if body.trim().is_empty() => Self::api_error(status, "no response body"),
            _ => Self::api_error(status, body.trim()),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the request was rejected for missing or foreign credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
