// handlers/protected/workouts.rs - /workouts

use axum::extract::{Query, State};
use serde::Deserialize;

use super::utils::parse_optional_uuid;
use crate::auth::AuthUser;
use crate::gateway::Entity;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{Activity, NewWorkout, Workout};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkoutQuery {
    pub activity_id: Option<String>,
}

/// GET /workouts[?activity_id=]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<WorkoutQuery>,
) -> ApiResult<Vec<Workout>> {
    let mut select = Workout::query();
    if let Some(activity_id) = parse_optional_uuid("activity_id", query.activity_id.as_deref())? {
        select = select.eq("activity_id", activity_id);
    }

    let workouts = state.repository::<Workout>().select_any(select).await?;
    Ok(ApiResponse::success(workouts))
}

/// POST /workouts - `type` is `resistance` or `cardio`
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<NewWorkout>,
) -> ApiResult<Vec<Workout>> {
    require_non_empty("name", &body.name)?;
    state.repository::<Activity>().select_404(body.activity_id).await?;

    let created = state.repository::<Workout>().insert(&body).await?;
    Ok(ApiResponse::success(created))
}
