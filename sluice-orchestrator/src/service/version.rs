//! Config version guard
//!
//! Extracts the compare-and-swap token a save is based on.

use axum::http::HeaderMap;
use sluice_core::domain::pipeline::ConfigVersion;
use sluice_core::dto::config::CONFIG_VERSION_HEADER;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("no config version specified")]
    Missing,

    #[error("config version is malformed: expected integer")]
    Malformed,
}

/// Read the config version header of a save request
pub fn config_version(headers: &HeaderMap) -> Result<ConfigVersion, VersionError> {
    let value = headers
        .get(CONFIG_VERSION_HEADER)
        .ok_or(VersionError::Missing)?;
    let token = value.to_str().map_err(|_| VersionError::Malformed)?;

    parse_version(token)
}

/// Parse a version token; only non-negative decimal integers are accepted
pub fn parse_version(token: &str) -> Result<ConfigVersion, VersionError> {
    token.parse().map_err(|_| VersionError::Malformed)
}
