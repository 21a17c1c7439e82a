// handlers/public/status.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Trena API",
        "version": version,
        "description": "Fitness tracking API over Supabase",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "public_auth": "/auth/signup, /auth/login, /auth/refresh, /auth/user (public - token acquisition)",
            "users": "/users[/:id][/exercise-logs] (protected)",
            "activities": "/activities[/:id], /user-activities (protected)",
            "plans": "/plans[/:id][/groups], /exercise-groups[/:id][/exercises] (protected)",
            "exercises": "/exercises[/:id], /exercise-logs (protected)",
            "workouts": "/workouts, /workout-plans[/:id][/days], /logged-workouts[/:id][/sets|/cardio] (protected)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.gateway.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "gateway": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "gateway": "unavailable"
                })),
            )
        }
    }
}
