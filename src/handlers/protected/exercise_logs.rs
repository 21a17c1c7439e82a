// handlers/protected/exercise_logs.rs - /exercise-logs

use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::utils::parse_limit;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gateway::{Entity, SortDirection};
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::models::{Exercise, ExerciseLog, ExerciseLogEntry, ExerciseLogInsert, NewExerciseLog};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogListQuery {
    pub limit: Option<String>,
}

/// Logs for one user with their exercise embedded, newest first.
pub(crate) async fn list_logs_for(
    state: &AppState,
    user_id: Uuid,
    query: &LogListQuery,
) -> Result<Vec<ExerciseLogEntry>, ApiError> {
    let mut select = ExerciseLogEntry::query()
        .eq("user_id", user_id)
        .order("created_at", SortDirection::Desc);
    if let Some(limit) = parse_limit(query.limit.as_deref())? {
        select = select.limit(limit);
    }

    Ok(state.repository::<ExerciseLogEntry>().select_any(select).await?)
}

/// GET /exercise-logs - the caller's history
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LogListQuery>,
) -> ApiResult<Vec<ExerciseLogEntry>> {
    let logs = list_logs_for(&state, user.id, &query).await?;
    Ok(ApiResponse::success(logs))
}

/// POST /exercise-logs - record a performance for the caller
///
/// Expected Input:
/// ```json
/// { "exercise_id": "uuid", "metrics": { "reps": 8, "weight": 60 } }
/// ```
///
/// Responds with the stored log and its exercise under `exercise`.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(body): Payload<NewExerciseLog>,
) -> ApiResult<ExerciseLogEntry> {
    let exercise = state.repository::<Exercise>().select_404(body.exercise_id).await?;

    let log = state
        .repository::<ExerciseLog>()
        .insert_one(&ExerciseLogInsert {
            user_id: user.id,
            exercise_id: exercise.id,
            metrics: body.metrics,
        })
        .await?;
    info!(user_id = %user.id, exercise_id = %exercise.id, "Exercise logged");

    Ok(ApiResponse::success(ExerciseLogEntry::new(log, exercise)))
}
