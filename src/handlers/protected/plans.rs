// handlers/protected/plans.rs - /plans

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::utils::{parse_optional_uuid, parse_uuid};
use crate::auth::AuthUser;
use crate::gateway::Entity;
use crate::middleware::{require_non_empty, ApiResponse, ApiResult, Payload};
use crate::models::{ExerciseGroup, NewPlan, Plan, UserActivity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub user_activity_id: Option<String>,
}

/// GET /plans[?user_activity_id=]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PlanQuery>,
) -> ApiResult<Vec<Plan>> {
    let mut select = Plan::query();
    if let Some(id) = parse_optional_uuid("user_activity_id", query.user_activity_id.as_deref())? {
        select = select.eq("user_activity_id", id);
    }

    let plans = state.repository::<Plan>().select_any(select).await?;
    Ok(ApiResponse::success(plans))
}

/// POST /plans
///
/// Expected Input:
/// ```json
/// { "user_activity_id": "uuid", "name": "Push Pull Legs" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<NewPlan>,
) -> ApiResult<Vec<Plan>> {
    require_non_empty("name", &body.name)?;
    state
        .repository::<UserActivity>()
        .select_404(body.user_activity_id)
        .await?;

    let created = state.repository::<Plan>().insert(&body).await?;
    Ok(ApiResponse::success(created))
}

/// GET /plans/:id
pub async fn get(State(state): State<AppState>, _user: AuthUser, Path(id): Path<String>) -> ApiResult<Plan> {
    let id = parse_uuid("id", &id)?;
    let plan = state.repository::<Plan>().select_404(id).await?;
    Ok(ApiResponse::success(plan))
}

/// GET /plans/:id/groups
pub async fn groups(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<ExerciseGroup>> {
    let id = parse_uuid("id", &id)?;
    let plan = state.repository::<Plan>().select_404(id).await?;

    let groups = state
        .repository::<ExerciseGroup>()
        .select_any(ExerciseGroup::query().eq("plan_id", plan.id))
        .await?;
    Ok(ApiResponse::success(groups))
}
