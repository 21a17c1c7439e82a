// handlers/protected/exercise_groups.rs - /exercise-groups

use axum::extract::{Path, State};
use tracing::info;

use super::utils::parse_uuid;
use crate::auth::AuthUser;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{
    AddExerciseResponse, Exercise, ExerciseGroup, ExerciseGroupDetail, ExerciseGroupExercise,
    ExerciseGroupWithExercises, GroupExercisesResponse, NewExerciseGroup, NewGroupExercise, Plan,
};
use crate::state::AppState;

/// POST /exercise-groups
///
/// Expected Input:
/// ```json
/// { "plan_id": "uuid", "day_of_week": 1, "name": "Push" }
/// ```
///
/// `day_of_week` is optional. 404 if the plan does not exist.
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<NewExerciseGroup>,
) -> ApiResult<Vec<ExerciseGroup>> {
    require_non_empty("name", &body.name)?;
    state.repository::<Plan>().select_404(body.plan_id).await?;

    let created = state.repository::<ExerciseGroup>().insert(&body).await?;
    Ok(ApiResponse::success(created))
}

/// GET /exercise-groups/:id - the group with an `exercises` list
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ExerciseGroupDetail> {
    let id = parse_uuid("id", &id)?;
    let (group, exercises) = state
        .repository::<ExerciseGroupWithExercises>()
        .select_404(id)
        .await?
        .into_parts();

    Ok(ApiResponse::success(ExerciseGroupDetail { group, exercises }))
}

/// GET /exercise-groups/:id/exercises
///
/// Expected Output (Success):
/// ```json
/// { "exercise_group_id": "uuid", "group_name": "Push", "exercises": [ ... ] }
/// ```
pub async fn exercises(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<GroupExercisesResponse> {
    let id = parse_uuid("id", &id)?;
    let (group, exercises) = state
        .repository::<ExerciseGroupWithExercises>()
        .select_404(id)
        .await?
        .into_parts();

    Ok(ApiResponse::success(GroupExercisesResponse {
        exercise_group_id: group.id,
        group_name: group.name,
        exercises,
    }))
}

/// POST /exercise-groups/:id/exercises - link an existing exercise to the group
///
/// Both parents are checked (concurrently) before the link is written; either
/// missing is a 404 and nothing is inserted.
pub async fn add_exercise(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Payload(body): Payload<NewGroupExercise>,
) -> ApiResult<AddExerciseResponse> {
    let id = parse_uuid("id", &id)?;
    let groups = state.repository::<ExerciseGroup>();
    let exercises = state.repository::<Exercise>();

    let (group, exercise) = futures::try_join!(groups.select_404(id), exercises.select_404(body.exercise_id))?;

    state
        .repository::<ExerciseGroupExercise>()
        .insert(&ExerciseGroupExercise {
            exercise_group_id: group.id,
            exercise_id: exercise.id,
        })
        .await?;
    info!(exercise_group_id = %group.id, exercise_id = %exercise.id, "Exercise added to group");

    Ok(ApiResponse::success(AddExerciseResponse {
        exercise_group_id: group.id,
        group_name: group.name,
        exercise,
    }))
}
