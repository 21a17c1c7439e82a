// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use tracing::info;

use super::CredentialsRequest;
use crate::auth::provider::Session;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::state::AppState;

/// POST /auth/login - Authenticate with email and password
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "access_token": "eyJhbGciOiJIUzI1NiI...", "refresh_token": "...", "expires_in": 3600 }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    Payload(body): Payload<CredentialsRequest>,
) -> ApiResult<Session> {
    let credentials = body.validate()?;
    let session = state.identity.sign_in(&credentials).await?;
    info!(email = %credentials.email, "Signed in");

    Ok(ApiResponse::success(session))
}
