// handlers/protected/workout_plans.rs - /workout-plans
//
// Plans are private to their owner. Another user's plan is reported as 404,
// same as a missing one.

use axum::extract::{Path, State};

use super::utils::parse_uuid;
use crate::auth::AuthUser;
use crate::gateway::{Entity, Filter};
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{
    Activity, NewWorkoutPlan, NewWorkoutPlanDay, WorkoutPlan, WorkoutPlanDay, WorkoutPlanDayInsert,
    WorkoutPlanInsert, WorkoutPlanWithDays,
};
use crate::state::AppState;

/// GET /workout-plans
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<WorkoutPlan>> {
    let plans = state
        .repository::<WorkoutPlan>()
        .select_any(WorkoutPlan::query().eq("user_id", user.id))
        .await?;
    Ok(ApiResponse::success(plans))
}

/// POST /workout-plans
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(body): Payload<NewWorkoutPlan>,
) -> ApiResult<Vec<WorkoutPlan>> {
    require_non_empty("name", &body.name)?;
    state.repository::<Activity>().select_404(body.activity_id).await?;

    let created = state
        .repository::<WorkoutPlan>()
        .insert(&WorkoutPlanInsert {
            user_id: user.id,
            activity_id: body.activity_id,
            name: body.name,
        })
        .await?;
    Ok(ApiResponse::success(created))
}

/// GET /workout-plans/:id - the plan with its `days`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<WorkoutPlanWithDays> {
    let id = parse_uuid("id", &id)?;
    let plan = state
        .repository::<WorkoutPlanWithDays>()
        .select_404_where(id, vec![Filter::eq("user_id", user.id)])
        .await?;
    Ok(ApiResponse::success(plan))
}

/// POST /workout-plans/:id/days
pub async fn add_day(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Payload(body): Payload<NewWorkoutPlanDay>,
) -> ApiResult<Vec<WorkoutPlanDay>> {
    let id = parse_uuid("id", &id)?;
    let plan = state
        .repository::<WorkoutPlan>()
        .select_404_where(id, vec![Filter::eq("user_id", user.id)])
        .await?;

    let created = state
        .repository::<WorkoutPlanDay>()
        .insert(&WorkoutPlanDayInsert {
            workout_plan_id: plan.id,
            day_number: body.day_number,
        })
        .await?;
    Ok(ApiResponse::success(created))
}
