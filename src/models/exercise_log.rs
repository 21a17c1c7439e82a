use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{nullable, Exercise};
use crate::gateway::{Embed, Entity, Query};

/// One recorded performance of an exercise. `metrics` is free-form
/// (reps, weight, duration, ...) and never inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub user_id: Uuid,
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for ExerciseLog {
    const TABLE: &'static str = "exercise_logs";
    const NAME: &'static str = "Exercise log";
}

#[derive(Debug, Deserialize)]
pub struct NewExerciseLog {
    pub exercise_id: Uuid,
    pub metrics: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseLogInsert {
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub metrics: Map<String, Value>,
}

/// A log with its exercise nested under `exercise`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercise: Option<Exercise>,
}

impl Entity for ExerciseLogEntry {
    const TABLE: &'static str = "exercise_logs";
    const NAME: &'static str = "Exercise log";

    fn query() -> Query {
        Query::table(Self::TABLE).embed(Embed::belongs_to("exercises", "exercise_id").alias("exercise"))
    }
}

impl ExerciseLogEntry {
    pub fn new(log: ExerciseLog, exercise: Exercise) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            exercise_id: log.exercise_id,
            metrics: log.metrics,
            created_at: log.created_at,
            exercise: Some(exercise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_metrics_decode_as_empty_object() {
        let log: ExerciseLog = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "exercise_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "metrics": null,
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap();
        assert!(log.metrics.is_empty());
        assert!(log.created_at.is_some());
    }

    #[test]
    fn metrics_pass_through_untouched() {
        let metrics = json!({"reps": 8, "weight": 62.5, "notes": {"rpe": 8}});
        let log: ExerciseLog = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "exercise_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "metrics": metrics.clone(),
        }))
        .unwrap();
        assert_eq!(Value::Object(log.metrics), metrics);
    }
}
