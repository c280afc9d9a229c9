//! Config DTOs for saving and reading pipeline definitions

use serde::{Deserialize, Serialize};

use crate::domain::config::{Config, RawConfig};
use crate::domain::validation::ConfigWarning;

/// Header carrying the config version, in both directions
pub const CONFIG_VERSION_HEADER: &str = "x-sluice-config-version";

/// Multipart form field holding the pause instruction
pub const PAUSED_FIELD: &str = "paused";

/// Content type prefix of multipart submissions
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Structured-text encodings a config document can be submitted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Yaml,
}

impl ContentKind {
    /// Resolve a `Content-Type` header value, ignoring parameters and case
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match media_type(content_type).as_str() {
            "application/json" => Some(ContentKind::Json),
            "application/x-yaml" | "application/yaml" | "text/yaml" | "text/x-yaml" => {
                Some(ContentKind::Yaml)
            }
            _ => None,
        }
    }

    /// Canonical media type
    pub fn mime(self) -> &'static str {
        match self {
            ContentKind::Json => "application/json",
            ContentKind::Yaml => "application/x-yaml",
        }
    }
}

/// Lowercased media type of a `Content-Type` value, without parameters
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Body of a successful save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfigResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigWarning>,
}

/// Body of a rejected request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}

/// Body of a config read
///
/// `config` is `null` when the stored document can no longer be decoded; in
/// that case `errors` says why and `raw_config` still holds the stored text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub config: Option<Config>,
    pub raw_config: RawConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_kind_from_content_type() {
        assert_eq!(
            ContentKind::from_content_type("application/json"),
            Some(ContentKind::Json)
        );
        assert_eq!(
            ContentKind::from_content_type("application/x-yaml; charset=utf-8"),
            Some(ContentKind::Yaml)
        );
        assert_eq!(
            ContentKind::from_content_type("Application/JSON"),
            Some(ContentKind::Json)
        );
        assert_eq!(ContentKind::from_content_type("application/x-toml"), None);
        assert_eq!(ContentKind::from_content_type(""), None);
    }

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(
            media_type("multipart/form-data; boundary=abc"),
            MULTIPART_FORM_DATA
        );
    }

    #[test]
    fn test_save_response_without_warnings_is_empty_object() {
        let body = serde_json::to_value(SaveConfigResponse::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_save_response_warning_shape() {
        let body = serde_json::to_value(SaveConfigResponse {
            warnings: vec![ConfigWarning::new("deprecation", "deprecated")],
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"warnings": [{"type": "deprecation", "message": "deprecated"}]})
        );
    }

    #[test]
    fn test_malformed_config_response_shape() {
        let body = serde_json::to_value(ConfigResponse {
            config: None,
            raw_config: RawConfig::from("raw-config"),
            errors: Some(vec!["malformed config: invalid character".to_string()]),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "config": null,
                "raw_config": "raw-config",
                "errors": ["malformed config: invalid character"]
            })
        );
    }

    #[test]
    fn test_clean_config_response_omits_errors() {
        let body = serde_json::to_value(ConfigResponse {
            config: Some(Config::default()),
            raw_config: RawConfig::from("{}"),
            errors: None,
        })
        .unwrap();

        assert_eq!(body, json!({"config": {}, "raw_config": "{}"}));
    }
}
