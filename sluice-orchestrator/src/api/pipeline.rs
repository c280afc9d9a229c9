//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sluice_core::domain::pipeline::Pipeline;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::pipeline_service;

/// GET /api/v1/teams/{team}/pipelines
/// List the pipelines of a team
pub async fn list_pipelines(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> ApiResult<Json<Vec<Pipeline>>> {
    tracing::debug!("Listing pipelines of team {}", team);

    let pipelines = pipeline_service::list_pipelines(state.store.as_ref(), &team).await?;

    Ok(Json(pipelines))
}

/// PUT /api/v1/teams/{team}/pipelines/{pipeline}/pause
pub async fn pause_pipeline(
    State(state): State<AppState>,
    Path((team, pipeline)): Path<(String, String)>,
) -> ApiResult<Json<Pipeline>> {
    let pipeline = pipeline_service::pause_pipeline(state.store.as_ref(), &team, &pipeline).await?;

    Ok(Json(pipeline))
}

/// PUT /api/v1/teams/{team}/pipelines/{pipeline}/unpause
pub async fn unpause_pipeline(
    State(state): State<AppState>,
    Path((team, pipeline)): Path<(String, String)>,
) -> ApiResult<Json<Pipeline>> {
    let pipeline =
        pipeline_service::unpause_pipeline(state.store.as_ref(), &team, &pipeline).await?;

    Ok(Json(pipeline))
}

/// DELETE /api/v1/teams/{team}/pipelines/{pipeline}
/// Delete a pipeline
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Path((team, pipeline)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting pipeline: {}/{}", team, pipeline);

    pipeline_service::delete_pipeline(state.store.as_ref(), &team, &pipeline).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::repository::{MemoryPipelineStore, PipelineStore, SaveConfig};
    use crate::service::validate::ConfigValidator;
    use crate::testing::{AUTH_HEADER, FakeValidator, json_body, router, sample_config};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use sluice_core::domain::config::RawConfig;
    use sluice_core::domain::pipeline::{ConfigVersion, PausedState};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, AUTH_HEADER)
            .body(Body::empty())
            .unwrap()
    }

    async fn seeded_store() -> Arc<dyn PipelineStore> {
        let store = MemoryPipelineStore::new();
        let config = sample_config();
        let raw_config = RawConfig::from("raw");

        for name in ["beta", "alpha"] {
            store
                .save_config(SaveConfig {
                    team: "main",
                    name,
                    config: &config,
                    raw_config: &raw_config,
                    from: ConfigVersion(0),
                    paused: PausedState::NoChange,
                })
                .await
                .unwrap();
        }

        Arc::new(store)
    }

    fn app(store: &Arc<dyn PipelineStore>) -> axum::Router {
        let validator: Arc<dyn ConfigValidator> = Arc::new(FakeValidator::default());
        router(store.clone(), validator)
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = seeded_store().await;
        let response = app(&store)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_pipelines() {
        let store = seeded_store().await;

        let response = app(&store)
            .oneshot(request("GET", "/api/v1/teams/main/pipelines"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert_eq!(body[0]["paused"], json!(true));
        assert_eq!(body[0]["version"], json!(1));
    }

    #[tokio::test]
    async fn test_list_pipelines_of_another_team() {
        let store = seeded_store().await;

        let response = app(&store)
            .oneshot(request("GET", "/api/v1/teams/other/pipelines"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_pause_and_unpause() {
        let store = seeded_store().await;

        let response = app(&store)
            .oneshot(request("PUT", "/api/v1/teams/main/pipelines/alpha/unpause"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["paused"], json!(false));
        assert_eq!(body["version"], json!(1));

        let response = app(&store)
            .oneshot(request("PUT", "/api/v1/teams/main/pipelines/alpha/pause"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["paused"], json!(true));
    }

    #[tokio::test]
    async fn test_pause_missing_pipeline() {
        let store = seeded_store().await;

        let response = app(&store)
            .oneshot(request("PUT", "/api/v1/teams/main/pipelines/nope/pause"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_pipeline() {
        let store = seeded_store().await;

        let response = app(&store)
            .oneshot(request("DELETE", "/api/v1/teams/main/pipelines/alpha"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app(&store)
            .oneshot(request("DELETE", "/api/v1/teams/main/pipelines/alpha"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let pipelines = store.list_pipelines("main").await.unwrap();
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].name, "beta");
    }
}
