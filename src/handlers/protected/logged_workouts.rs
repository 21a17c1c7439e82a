// handlers/protected/logged_workouts.rs - /logged-workouts

use axum::extract::{Path, State};
use chrono::Utc;
use uuid::Uuid;

use super::utils::parse_uuid;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gateway::{Entity, Filter, SortDirection};
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::models::{
    LoggedCardio, LoggedCardioInsert, LoggedSet, LoggedSetInsert, LoggedWorkout, LoggedWorkoutDetail,
    LoggedWorkoutInsert, NewLoggedCardio, NewLoggedSet, NewLoggedWorkout, Workout,
};
use crate::state::AppState;

/// The caller's logged workout, or 404 (including when it belongs to someone else).
async fn owned(state: &AppState, user: &AuthUser, id: &str) -> Result<LoggedWorkout, ApiError> {
    let id: Uuid = parse_uuid("id", id)?;
    Ok(state
        .repository::<LoggedWorkout>()
        .select_404_where(id, vec![Filter::eq("user_id", user.id)])
        .await?)
}

/// GET /logged-workouts - newest first
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<LoggedWorkout>> {
    let select = LoggedWorkout::query()
        .eq("user_id", user.id)
        .order("date", SortDirection::Desc);
    let workouts = state.repository::<LoggedWorkout>().select_any(select).await?;
    Ok(ApiResponse::success(workouts))
}

/// POST /logged-workouts - `date` defaults to now
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(body): Payload<NewLoggedWorkout>,
) -> ApiResult<Vec<LoggedWorkout>> {
    let workout = state.repository::<Workout>().select_404(body.workout_id).await?;

    let created = state
        .repository::<LoggedWorkout>()
        .insert(&LoggedWorkoutInsert {
            user_id: user.id,
            workout_id: workout.id,
            date: body.date.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(ApiResponse::success(created))
}

/// GET /logged-workouts/:id - with `sets` and `cardio`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<LoggedWorkoutDetail> {
    let id = parse_uuid("id", &id)?;
    let detail = state
        .repository::<LoggedWorkoutDetail>()
        .select_404_where(id, vec![Filter::eq("user_id", user.id)])
        .await?;
    Ok(ApiResponse::success(detail))
}

/// POST /logged-workouts/:id/sets
pub async fn add_set(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Payload(body): Payload<NewLoggedSet>,
) -> ApiResult<Vec<LoggedSet>> {
    let workout = owned(&state, &user, &id).await?;

    let created = state
        .repository::<LoggedSet>()
        .insert(&LoggedSetInsert {
            logged_workout_id: workout.id,
            reps: body.reps,
            weight: body.weight,
        })
        .await?;
    Ok(ApiResponse::success(created))
}

/// POST /logged-workouts/:id/cardio
pub async fn add_cardio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Payload(body): Payload<NewLoggedCardio>,
) -> ApiResult<Vec<LoggedCardio>> {
    let workout = owned(&state, &user, &id).await?;

    let created = state
        .repository::<LoggedCardio>()
        .insert(&LoggedCardioInsert {
            logged_workout_id: workout.id,
            speed: body.speed,
            duration: body.duration,
            pace: body.pace,
        })
        .await?;
    Ok(ApiResponse::success(created))
}
