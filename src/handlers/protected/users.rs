// handlers/protected/users.rs - /users

use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::exercise_logs::{list_logs_for, LogListQuery};
use super::utils::parse_uuid;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gateway::Entity;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{ExerciseLogEntry, NewUser, User, UserInsert, UserPatch};
use crate::state::AppState;

/// GET /users
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Vec<User>> {
    let users = state.repository::<User>().select_any(User::query()).await?;
    Ok(ApiResponse::success(users))
}

/// POST /users - create the caller's profile row
///
/// The id is the token subject. `email` defaults to the token's email.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(body): Payload<NewUser>,
) -> ApiResult<Vec<User>> {
    let email = body.email.unwrap_or(user.email);
    require_non_empty("email", &email)?;

    let created = state
        .repository::<User>()
        .insert(&UserInsert { id: user.id, email })
        .await?;
    Ok(ApiResponse::success(created))
}

/// GET /users/:id
pub async fn get(State(state): State<AppState>, _user: AuthUser, Path(id): Path<String>) -> ApiResult<User> {
    let id = parse_uuid("id", &id)?;
    let found = state.repository::<User>().select_404(id).await?;
    Ok(ApiResponse::success(found))
}

/// Parses a path id that must name the caller. Anyone else reads as missing.
fn own_id(user: &AuthUser, field: &str, raw: &str) -> Result<Uuid, ApiError> {
    let id = parse_uuid(field, raw)?;
    if id != user.id {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(id)
}

/// PUT /users/:id - caller only
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Payload(patch): Payload<UserPatch>,
) -> ApiResult<User> {
    let id = own_id(&user, "id", &id)?;
    require_non_empty("email", &patch.email)?;

    let updated = state.repository::<User>().update(id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /users/:id - caller only
pub async fn delete(State(state): State<AppState>, user: AuthUser, Path(id): Path<String>) -> ApiResult<()> {
    let id = own_id(&user, "id", &id)?;
    state.repository::<User>().delete(id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// GET /users/:user_id/exercise-logs - caller only, newest first
pub async fn exercise_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<LogListQuery>,
) -> ApiResult<Vec<ExerciseLogEntry>> {
    let user_id = own_id(&user, "user_id", &user_id)?;
    let logs = list_logs_for(&state, user_id, &query).await?;
    Ok(ApiResponse::success(logs))
}
