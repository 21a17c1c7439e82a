use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_activity_id: Uuid,
    pub name: String,
}

impl Entity for Plan {
    const TABLE: &'static str = "plans";
    const NAME: &'static str = "Plan";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewPlan {
    pub user_activity_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGroup {
    pub id: Uuid,
    pub plan_id: Uuid,
    #[serde(default)]
    pub day_of_week: Option<i32>,
    pub name: String,
}

impl Entity for ExerciseGroup {
    const TABLE: &'static str = "exercise_groups";
    const NAME: &'static str = "Exercise group";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewExerciseGroup {
    pub plan_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<i32>,
    pub name: String,
}
