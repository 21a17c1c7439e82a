// handlers/protected/exercises.rs - /exercises

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::utils::{parse_optional_uuid, parse_uuid};
use crate::auth::AuthUser;
use crate::gateway::Entity;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{Exercise, NewExercise};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
    pub category_id: Option<String>,
}

/// GET /exercises[?category_id=]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ExerciseQuery>,
) -> ApiResult<Vec<Exercise>> {
    let mut select = Exercise::query();
    if let Some(category_id) = parse_optional_uuid("category_id", query.category_id.as_deref())? {
        select = select.eq("category_id", category_id);
    }

    let exercises = state.repository::<Exercise>().select_any(select).await?;
    Ok(ApiResponse::success(exercises))
}

/// POST /exercises
///
/// Expected Input:
/// ```json
/// { "name": "Bench Press", "description": "optional", "tracking_type": "weight_reps", "category_id": "optional uuid" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<NewExercise>,
) -> ApiResult<Vec<Exercise>> {
    require_non_empty("name", &body.name)?;
    require_non_empty("tracking_type", &body.tracking_type)?;

    let created = state.repository::<Exercise>().insert(&body).await?;
    Ok(ApiResponse::success(created))
}

/// GET /exercises/:id
pub async fn get(State(state): State<AppState>, _user: AuthUser, Path(id): Path<String>) -> ApiResult<Exercise> {
    let id = parse_uuid("id", &id)?;
    let exercise = state.repository::<Exercise>().select_404(id).await?;
    Ok(ApiResponse::success(exercise))
}
