//! Multipart config submissions
//!
//! A multipart save carries the config document as a part with a structured
//! text content type, plus an optional `paused` form field that pauses or
//! unpauses the pipeline in the same request.

use axum::body::Bytes;
use sluice_core::domain::pipeline::PausedState;
use sluice_core::dto::config::{ContentKind, PAUSED_FIELD};
use std::convert::Infallible;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    #[error("malformed config")]
    Malformed { detail: String },

    #[error("invalid paused value")]
    InvalidPausedValue,
}

fn malformed(detail: impl ToString) -> MultipartError {
    MultipartError::Malformed {
        detail: detail.to_string(),
    }
}

/// The document part of a multipart submission, not yet decoded
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPart {
    pub kind: ContentKind,
    pub body: Bytes,
    /// Every value given for the `paused` field, in order
    pub paused_values: Vec<String>,
}

impl ConfigPart {
    /// Pause instruction carried alongside the document
    ///
    /// Only checked once the document itself has decoded, so a malformed
    /// document is reported ahead of a bad `paused` value.
    pub fn paused(&self) -> Result<PausedState, MultipartError> {
        match self.paused_values.as_slice() {
            [] => Ok(PausedState::NoChange),
            [value] => parse_paused(Some(value.as_str())),
            _ => Err(MultipartError::InvalidPausedValue),
        }
    }
}

/// Split a `multipart/form-data` body into its config part and pause instruction
pub async fn split(content_type: &str, body: Bytes) -> Result<ConfigPart, MultipartError> {
    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut document: Option<(ContentKind, Bytes)> = None;
    let mut paused_values = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() == Some(PAUSED_FIELD) {
            paused_values.push(field.text().await.map_err(malformed)?);
            continue;
        }

        let Some(kind) = field
            .content_type()
            .and_then(|mime| ContentKind::from_content_type(mime.essence_str()))
        else {
            continue;
        };

        let data = field.bytes().await.map_err(malformed)?;
        if document.replace((kind, data)).is_some() {
            return Err(malformed("more than one config part"));
        }
    }

    let (kind, body) = document.ok_or_else(|| malformed("no config part"))?;

    Ok(ConfigPart {
        kind,
        body,
        paused_values,
    })
}

/// Interpret the `paused` form field
pub fn parse_paused(value: Option<&str>) -> Result<PausedState, MultipartError> {
    match value {
        None => Ok(PausedState::NoChange),
        Some("true") => Ok(PausedState::Pause),
        Some("false") => Ok(PausedState::Unpause),
        Some(_) => Err(MultipartError::InvalidPausedValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MultipartBody;

    #[test]
    fn test_parse_paused() {
        assert_eq!(parse_paused(None), Ok(PausedState::NoChange));
        assert_eq!(parse_paused(Some("true")), Ok(PausedState::Pause));
        assert_eq!(parse_paused(Some("false")), Ok(PausedState::Unpause));
        assert_eq!(
            parse_paused(Some("junk")),
            Err(MultipartError::InvalidPausedValue)
        );
        assert_eq!(
            parse_paused(Some("True")),
            Err(MultipartError::InvalidPausedValue)
        );
    }

    #[tokio::test]
    async fn test_split_yaml_part_without_paused() {
        let body = MultipartBody::new().part("application/x-yaml", "jobs: []\n");

        let part = split(&body.content_type(), body.bytes()).await.unwrap();

        assert_eq!(part.kind, ContentKind::Yaml);
        assert_eq!(&part.body[..], b"jobs: []\n");
        assert_eq!(part.paused(), Ok(PausedState::NoChange));
    }

    #[tokio::test]
    async fn test_split_with_paused_field() {
        for (value, expected) in [("true", PausedState::Pause), ("false", PausedState::Unpause)] {
            let body = MultipartBody::new()
                .part("application/x-yaml", "jobs: []\n")
                .field(PAUSED_FIELD, value);

            let part = split(&body.content_type(), body.bytes()).await.unwrap();
            assert_eq!(part.paused(), Ok(expected));
        }
    }

    #[tokio::test]
    async fn test_split_rejects_junk_paused_value() {
        let body = MultipartBody::new()
            .part("application/x-yaml", "jobs: []\n")
            .field(PAUSED_FIELD, "junk");

        let part = split(&body.content_type(), body.bytes()).await.unwrap();
        let err = part.paused().unwrap_err();
        assert_eq!(err, MultipartError::InvalidPausedValue);
        assert_eq!(err.to_string(), "invalid paused value");
    }

    #[tokio::test]
    async fn test_split_rejects_repeated_paused_field() {
        let body = MultipartBody::new()
            .part("application/x-yaml", "jobs: []\n")
            .field(PAUSED_FIELD, "true")
            .field(PAUSED_FIELD, "true");

        let part = split(&body.content_type(), body.bytes()).await.unwrap();
        assert_eq!(part.paused_values.len(), 2);
        let err = part.paused().unwrap_err();
        assert_eq!(err, MultipartError::InvalidPausedValue);
    }

    #[tokio::test]
    async fn test_split_accepts_json_part() {
        let body = MultipartBody::new().part("application/json", "{}");

        let part = split(&body.content_type(), body.bytes()).await.unwrap();
        assert_eq!(part.kind, ContentKind::Json);
    }

    #[tokio::test]
    async fn test_split_without_config_part() {
        let body = MultipartBody::new()
            .part("application/x-toml", "jobs = []")
            .field(PAUSED_FIELD, "true");

        let err = split(&body.content_type(), body.bytes()).await.unwrap_err();
        assert!(matches!(err, MultipartError::Malformed { .. }));
        assert_eq!(err.to_string(), "malformed config");
    }

    #[tokio::test]
    async fn test_split_with_two_config_parts() {
        let body = MultipartBody::new()
            .part("application/x-yaml", "jobs: []\n")
            .part("application/json", "{}");

        let err = split(&body.content_type(), body.bytes()).await.unwrap_err();
        assert!(matches!(err, MultipartError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_split_without_boundary() {
        let err = split("multipart/form-data", Bytes::from_static(b"--x\r\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, MultipartError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_split_truncated_body() {
        let body = MultipartBody::new().part("application/x-yaml", "jobs: []\n");
        let bytes = body.bytes();
        let truncated = bytes.slice(..bytes.len() / 2);

        let err = split(&body.content_type(), truncated).await.unwrap_err();
        assert!(matches!(err, MultipartError::Malformed { .. }));
    }
}
