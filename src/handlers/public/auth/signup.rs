// handlers/public/auth/signup.rs - POST /auth/signup handler

use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use super::CredentialsRequest;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::state::AppState;

/// POST /auth/signup - Register a new account with the identity provider
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "session": { ...identity provider response, unmodified... } }
/// ```
///
/// Missing fields are a 400; a rejected sign-up (e.g. already registered) is a 401.
pub async fn signup_post(
    State(state): State<AppState>,
    Payload(body): Payload<CredentialsRequest>,
) -> ApiResult<Value> {
    let credentials = body.validate()?;
    let session = state.identity.sign_up(&credentials).await?;
    info!(email = %credentials.email, "Account registered");

    Ok(ApiResponse::success(json!({ "session": session })))
}
