// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::extract::State;
use serde::Deserialize;

use crate::auth::provider::Session;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// POST /auth/refresh - Exchange a refresh token for a new session
///
/// Returns the same shape as login. A revoked or unknown refresh token is a 401.
pub async fn refresh_post(
    State(state): State<AppState>,
    Payload(body): Payload<RefreshRequest>,
) -> ApiResult<Session> {
    require_non_empty("refresh_token", &body.refresh_token)?;
    let session = state.identity.refresh(&body.refresh_token).await?;

    Ok(ApiResponse::success(session))
}
