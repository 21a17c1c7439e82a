//! Records mirroring the remote tables, plus the joined shapes handlers return.
//!
//! Rows are owned by the datastore; these are transient DTOs decoded from the
//! gateway and serialized back out. Each joined shape is its own [`Entity`]
//! whose default query carries the embeds it expects.
//!
//! [`Entity`]: crate::gateway::Entity

pub mod activity;
pub mod exercise;
pub mod exercise_log;
pub mod plan;
pub mod user;
pub mod workout;

use serde::{Deserialize, Deserializer};

pub use activity::{Activity, NewActivity, NewUserActivity, UserActivity, UserActivityInsert, UserActivityWithActivity};
pub use exercise::{
    AddExerciseResponse, Exercise, ExerciseGroupDetail, ExerciseGroupExercise, ExerciseGroupWithExercises,
    GroupExercisesResponse, NewExercise, NewGroupExercise,
};
pub use exercise_log::{ExerciseLog, ExerciseLogEntry, ExerciseLogInsert, NewExerciseLog};
pub use plan::{ExerciseGroup, NewExerciseGroup, NewPlan, Plan};
pub use user::{NewUser, User, UserInsert, UserPatch};
pub use workout::{
    LoggedCardio, LoggedCardioInsert, LoggedSet, LoggedSetInsert, LoggedWorkout, LoggedWorkoutDetail,
    LoggedWorkoutInsert, NewLoggedCardio, NewLoggedSet, NewLoggedWorkout, NewWorkout, NewWorkoutPlan,
    NewWorkoutPlanDay, Workout, WorkoutPlan, WorkoutPlanDay, WorkoutPlanDayInsert, WorkoutPlanInsert,
    WorkoutPlanWithDays, WorkoutType,
};

/// Treats an explicit `null` like an absent field: embeds with no rows and
/// empty `metrics` decode to their defaults.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
