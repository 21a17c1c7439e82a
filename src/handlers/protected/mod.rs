// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here takes the verified caller as an `AuthUser` parameter.
// Rows that belong to a user (user activities, exercise logs, workout plans,
// logged workouts) are always written and listed for that caller, never for
// an id supplied in the body.

pub mod activities;
pub mod exercise_groups;
pub mod exercise_logs;
pub mod exercises;
pub mod logged_workouts;
pub mod plans;
pub mod user_activities;
pub mod users;
pub mod utils;
pub mod workout_plans;
pub mod workouts;
