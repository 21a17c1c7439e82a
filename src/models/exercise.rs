use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{nullable, ExerciseGroup};
use crate::gateway::{Embed, Entity, Query};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub tracking_type: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl Entity for Exercise {
    const TABLE: &'static str = "exercises";
    const NAME: &'static str = "Exercise";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tracking_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

/// Link row between a group and an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGroupExercise {
    pub exercise_group_id: Uuid,
    pub exercise_id: Uuid,
}

impl Entity for ExerciseGroupExercise {
    const TABLE: &'static str = "exercise_group_exercises";
    const NAME: &'static str = "Exercise group link";
}

/// Body of `POST /exercise-groups/:id/exercises`; the group comes from the path.
#[derive(Debug, Deserialize)]
pub struct NewGroupExercise {
    pub exercise_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkedExercise {
    pub exercise_id: Uuid,
    #[serde(default)]
    pub exercise: Option<Exercise>,
}

/// A group with its link rows, each carrying the linked exercise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExerciseGroupWithExercises {
    pub id: Uuid,
    pub plan_id: Uuid,
    #[serde(default)]
    pub day_of_week: Option<i32>,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub exercise_group_exercises: Vec<LinkedExercise>,
}

impl Entity for ExerciseGroupWithExercises {
    const TABLE: &'static str = "exercise_groups";
    const NAME: &'static str = "Exercise group";

    fn query() -> Query {
        Query::table(Self::TABLE).embed(
            Embed::has_many("exercise_group_exercises", "exercise_group_id")
                .columns(&["exercise_id"])
                .embed(Embed::belongs_to("exercises", "exercise_id").alias("exercise")),
        )
    }
}

impl ExerciseGroupWithExercises {
    /// Splits into the bare group and its exercises. Links whose exercise
    /// row is gone are skipped.
    pub fn into_parts(self) -> (ExerciseGroup, Vec<Exercise>) {
        let exercises = self
            .exercise_group_exercises
            .into_iter()
            .filter_map(|link| link.exercise)
            .collect();
        let group = ExerciseGroup {
            id: self.id,
            plan_id: self.plan_id,
            day_of_week: self.day_of_week,
            name: self.name,
        };
        (group, exercises)
    }
}

/// `GET /exercise-groups/:id`: the group's own fields plus `exercises`.
#[derive(Debug, Serialize)]
pub struct ExerciseGroupDetail {
    #[serde(flatten)]
    pub group: ExerciseGroup,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Serialize)]
pub struct GroupExercisesResponse {
    pub exercise_group_id: Uuid,
    pub group_name: String,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Serialize)]
pub struct AddExerciseResponse {
    pub exercise_group_id: Uuid,
    pub group_name: String,
    pub exercise: Exercise,
}
