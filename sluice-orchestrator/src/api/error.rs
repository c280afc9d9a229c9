//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sluice_core::dto::config::ErrorsResponse;

use crate::repository::StoreError;
use crate::service::config_service::SaveError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    /// Rejected input, reported as a JSON errors list
    BadRequest(Vec<String>),
    UnsupportedMediaType,
    /// Storage failure; the message goes back verbatim as plain text
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(ErrorsResponse { errors: vec![msg] }),
            )
                .into_response(),
            ApiError::BadRequest(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorsResponse { errors })).into_response()
            }
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::UnsupportedContentKind(content_type) => {
                tracing::warn!("Unsupported config content type: {:?}", content_type);
                ApiError::UnsupportedMediaType
            }
            SaveError::ValidationFailed(errors) => ApiError::BadRequest(errors),
            SaveError::Storage(_) => ApiError::InternalError(err.to_string()),
            SaveError::Version(_) | SaveError::Decode(_) | SaveError::Multipart(_) => {
                tracing::warn!("Rejected config: {:?}", err);
                ApiError::BadRequest(vec![err.to_string()])
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
