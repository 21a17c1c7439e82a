use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::nullable;
use crate::gateway::{Embed, Entity, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Resistance,
    Cardio,
}

/// A workout template belonging to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
}

impl Entity for Workout {
    const TABLE: &'static str = "workouts";
    const NAME: &'static str = "Workout";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewWorkout {
    pub activity_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
}

impl Entity for WorkoutPlan {
    const TABLE: &'static str = "workout_plans";
    const NAME: &'static str = "Workout plan";
}

#[derive(Debug, Deserialize)]
pub struct NewWorkoutPlan {
    pub activity_id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPlanInsert {
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlanDay {
    pub id: Uuid,
    pub workout_plan_id: Uuid,
    pub day_number: i32,
}

impl Entity for WorkoutPlanDay {
    const TABLE: &'static str = "workout_plan_days";
    const NAME: &'static str = "Workout plan day";
}

#[derive(Debug, Deserialize)]
pub struct NewWorkoutPlanDay {
    pub day_number: i32,
}

#[derive(Debug, Serialize)]
pub struct WorkoutPlanDayInsert {
    pub workout_plan_id: Uuid,
    pub day_number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlanWithDays {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub days: Vec<WorkoutPlanDay>,
}

impl Entity for WorkoutPlanWithDays {
    const TABLE: &'static str = "workout_plans";
    const NAME: &'static str = "Workout plan";

    fn query() -> Query {
        Query::table(Self::TABLE).embed(Embed::has_many("workout_plan_days", "workout_plan_id").alias("days"))
    }
}

/// A workout session the user actually did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedWorkout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub date: DateTime<Utc>,
}

impl Entity for LoggedWorkout {
    const TABLE: &'static str = "logged_workouts";
    const NAME: &'static str = "Logged workout";
}

#[derive(Debug, Deserialize)]
pub struct NewLoggedWorkout {
    pub workout_id: Uuid,
    /// Defaults to now.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct LoggedWorkoutInsert {
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    pub id: Uuid,
    pub logged_workout_id: Uuid,
    pub reps: i32,
    pub weight: f64,
}

impl Entity for LoggedSet {
    const TABLE: &'static str = "logged_sets";
    const NAME: &'static str = "Logged set";
}

#[derive(Debug, Deserialize)]
pub struct NewLoggedSet {
    pub reps: i32,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct LoggedSetInsert {
    pub logged_workout_id: Uuid,
    pub reps: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedCardio {
    pub id: Uuid,
    pub logged_workout_id: Uuid,
    pub speed: f64,
    /// Seconds.
    pub duration: i32,
    pub pace: f64,
}

impl Entity for LoggedCardio {
    const TABLE: &'static str = "logged_cardio";
    const NAME: &'static str = "Logged cardio";
}

#[derive(Debug, Deserialize)]
pub struct NewLoggedCardio {
    pub speed: f64,
    pub duration: i32,
    pub pace: f64,
}

#[derive(Debug, Serialize)]
pub struct LoggedCardioInsert {
    pub logged_workout_id: Uuid,
    pub speed: f64,
    pub duration: i32,
    pub pace: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedWorkoutDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "nullable")]
    pub sets: Vec<LoggedSet>,
    #[serde(default, deserialize_with = "nullable")]
    pub cardio: Vec<LoggedCardio>,
}

impl Entity for LoggedWorkoutDetail {
    const TABLE: &'static str = "logged_workouts";
    const NAME: &'static str = "Logged workout";

    fn query() -> Query {
        Query::table(Self::TABLE)
            .embed(Embed::has_many("logged_sets", "logged_workout_id").alias("sets"))
            .embed(Embed::has_many("logged_cardio", "logged_workout_id").alias("cardio"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workout_type_uses_type_key() {
        let workout: Workout = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "activity_id": Uuid::new_v4(),
            "name": "5k",
            "type": "cardio"
        }))
        .unwrap();
        assert_eq!(workout.workout_type, WorkoutType::Cardio);

        let body = serde_json::to_value(&workout).unwrap();
        assert_eq!(body["type"], "cardio");
        assert!(body.get("workout_type").is_none());
    }

    #[test]
    fn detail_query_embeds_sets_and_cardio() {
        let params = LoggedWorkoutDetail::query().to_postgrest_params();
        assert_eq!(params[0].1, "*,sets:logged_sets(*),cardio:logged_cardio(*)");
    }
}
