// handlers/protected/activities.rs - /activities

use axum::extract::{Path, State};

use super::utils::parse_uuid;
use crate::auth::AuthUser;
use crate::gateway::Entity;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{Activity, NewActivity};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Vec<Activity>> {
    let activities = state.repository::<Activity>().select_any(Activity::query()).await?;
    Ok(ApiResponse::success(activities))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<NewActivity>,
) -> ApiResult<Vec<Activity>> {
    require_non_empty("name", &body.name)?;
    let created = state.repository::<Activity>().insert(&body).await?;
    Ok(ApiResponse::success(created))
}

pub async fn get(State(state): State<AppState>, _user: AuthUser, Path(id): Path<String>) -> ApiResult<Activity> {
    let id = parse_uuid("id", &id)?;
    let activity = state.repository::<Activity>().select_404(id).await?;
    Ok(ApiResponse::success(activity))
}
