// handlers/public/auth/user.rs - GET /auth/user handler

use axum::{extract::State, http::HeaderMap};

use crate::auth::AuthUser;
use crate::middleware::{bearer_token, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /auth/user - Identity of the presented token
///
/// On the public allow-list, so the token is verified here rather than by the gate.
///
/// Expected Output (Success):
/// ```json
/// { "id": "user_uuid", "email": "user@example.com", "role": "authenticated" }
/// ```
pub async fn user_get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<AuthUser> {
    let token = bearer_token(&headers)?;
    let user = state.tokens.verify(token)?;

    Ok(ApiResponse::success(user))
}
