//! Request Authentication
//!
//! Resolves the team a request acts for from its bearer token and checks it
//! against the team named in the path.

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// Maps request credentials to the team they belong to
pub trait Authenticator: Send + Sync {
    /// Team of the caller, or `None` if the request is not authenticated
    fn authenticate(&self, headers: &HeaderMap) -> Option<String>;
}

/// Static bearer tokens, one team per token
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    teams_by_token: HashMap<String, String>,
}

impl TokenAuthenticator {
    pub fn new(teams_by_token: HashMap<String, String>) -> Self {
        Self { teams_by_token }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();

        self.teams_by_token.get(token).cloned()
    }
}

/// Ensure the caller is authenticated as `team`
pub fn authorize(auth: &dyn Authenticator, headers: &HeaderMap, team: &str) -> ApiResult<()> {
    match auth.authenticate(headers) {
        None => Err(ApiError::Unauthorized),
        Some(caller) if caller == team => Ok(()),
        Some(caller) => {
            tracing::warn!("Team {} denied access to team {}", caller, team);
            Err(ApiError::Forbidden)
        }
    }
}

/// Middleware guarding every `/teams/{team}/...` route
///
/// Runs before the handler extracts the body, so an unauthenticated request
/// is turned away without reading its payload.
pub async fn require_team(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let team = params.get("team").map(String::as_str).unwrap_or_default();
    authorize(state.auth.as_ref(), request.headers(), team)?;

    Ok(next.run(request).await)
}
