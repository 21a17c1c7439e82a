// handlers/protected/user_activities.rs - /user-activities

use axum::extract::{Query, State};
use serde::Deserialize;

use super::utils::parse_optional_uuid;
use crate::auth::AuthUser;
use crate::gateway::Entity;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::models::{Activity, NewUserActivity, UserActivity, UserActivityInsert, UserActivityWithActivity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserActivityQuery {
    pub activity_id: Option<String>,
}

/// GET /user-activities[?activity_id=] - the caller's activities, each with `activity`
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserActivityQuery>,
) -> ApiResult<Vec<UserActivityWithActivity>> {
    let mut select = UserActivityWithActivity::query().eq("user_id", user.id);
    if let Some(activity_id) = parse_optional_uuid("activity_id", query.activity_id.as_deref())? {
        select = select.eq("activity_id", activity_id);
    }

    let rows = state.repository::<UserActivityWithActivity>().select_any(select).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /user-activities - enrol the caller in an activity
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(body): Payload<NewUserActivity>,
) -> ApiResult<Vec<UserActivity>> {
    let activity = state.repository::<Activity>().select_404(body.activity_id).await?;

    let created = state
        .repository::<UserActivity>()
        .insert(&UserActivityInsert {
            user_id: user.id,
            activity_id: activity.id,
        })
        .await?;
    Ok(ApiResponse::success(created))
}
