use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::auth_gate;
use crate::state::AppState;

/// Full application router. The auth gate wraps every route; CORS and request
/// tracing sit outside it so preflights and rejected requests are still
/// answered with CORS headers and traced.
pub fn router(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Protected
        .merge(user_routes())
        .merge(activity_routes())
        .merge(plan_routes())
        .merge(exercise_routes())
        .merge(workout_routes())
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
        .route("/auth/user", get(auth::user_get))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/users/:id/exercise-logs", get(users::exercise_logs))
}

fn activity_routes() -> Router<AppState> {
    use protected::{activities, user_activities};

    Router::new()
        .route("/activities", get(activities::list).post(activities::create))
        .route("/activities/:id", get(activities::get))
        .route(
            "/user-activities",
            get(user_activities::list).post(user_activities::create),
        )
}

fn plan_routes() -> Router<AppState> {
    use protected::{exercise_groups, plans};

    Router::new()
        .route("/plans", get(plans::list).post(plans::create))
        .route("/plans/:id", get(plans::get))
        .route("/plans/:id/groups", get(plans::groups))
        .route("/exercise-groups", post(exercise_groups::create))
        .route("/exercise-groups/:id", get(exercise_groups::get))
        .route(
            "/exercise-groups/:id/exercises",
            get(exercise_groups::exercises).post(exercise_groups::add_exercise),
        )
}

fn exercise_routes() -> Router<AppState> {
    use protected::{exercise_logs, exercises};

    Router::new()
        .route("/exercises", get(exercises::list).post(exercises::create))
        .route("/exercises/:id", get(exercises::get))
        .route(
            "/exercise-logs",
            get(exercise_logs::list).post(exercise_logs::create),
        )
}

fn workout_routes() -> Router<AppState> {
    use protected::{logged_workouts, workout_plans, workouts};

    Router::new()
        .route("/workouts", get(workouts::list).post(workouts::create))
        .route(
            "/workout-plans",
            get(workout_plans::list).post(workout_plans::create),
        )
        .route("/workout-plans/:id", get(workout_plans::get))
        .route("/workout-plans/:id/days", post(workout_plans::add_day))
        .route(
            "/logged-workouts",
            get(logged_workouts::list).post(logged_workouts::create),
        )
        .route("/logged-workouts/:id", get(logged_workouts::get))
        .route("/logged-workouts/:id/sets", post(logged_workouts::add_set))
        .route("/logged-workouts/:id/cardio", post(logged_workouts::add_cardio))
}

/// Disabled CORS is an empty layer: no origin is ever allowed.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
