mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{read, spawn_app, Failure};

#[tokio::test]
async fn activities_create_list_get() -> Result<()> {
    let app = spawn_app().await?;

    let (status, created) = read(
        app.post("/activities", json!({"name": "Running", "description": "Outdoor"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created[0]["name"], "Running");
    let id = created[0]["id"].as_str().unwrap().to_string();

    let (_, listed) = read(app.get("/activities").send().await?).await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, one) = read(app.get(&format!("/activities/{}", id)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one, created[0]);
    assert_eq!(one, json!({"id": id, "name": "Running", "description": "Outdoor"}));

    let (status, body) = read(app.get(&format!("/activities/{}", Uuid::new_v4())).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Activity not found");
    Ok(())
}

#[tokio::test]
async fn created_plan_reads_back_unchanged() -> Result<()> {
    let app = spawn_app().await?;
    let (_, user_activity_id, _) = app.seed_plan();

    let (status, created) = read(
        app.post(
            "/plans",
            json!({"user_activity_id": user_activity_id, "name": "Push Pull Legs"}),
        )
        .send()
        .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let id = created[0]["id"].as_str().unwrap().to_string();

    let (status, fetched) = read(app.get(&format!("/plans/{}", id)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created[0]);
    assert_eq!(
        fetched,
        json!({"id": id, "user_activity_id": user_activity_id, "name": "Push Pull Legs"})
    );
    Ok(())
}

#[tokio::test]
async fn user_activities_belong_to_caller() -> Result<()> {
    let app = spawn_app().await?;
    let running = app.gateway.seed("activities", json!({"name": "Running"}));
    let lifting = app.gateway.seed("activities", json!({"name": "Lifting"}));

    // Someone else's enrolment is invisible
    app.gateway.seed(
        "user_activities",
        json!({"user_id": Uuid::new_v4(), "activity_id": running}),
    );

    let (status, created) = read(
        app.post("/user-activities", json!({"activity_id": running}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created[0]["user_id"], app.user_id.to_string());
    app.post("/user-activities", json!({"activity_id": lifting})).send().await?;

    let (_, mine) = read(app.get("/user-activities").send().await?).await?;
    let mine = mine.as_array().unwrap().clone();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|ua| ua["user_id"] == app.user_id.to_string()));
    assert!(mine.iter().any(|ua| ua["activity"]["name"] == "Lifting"));

    let (_, filtered) = read(
        app.get(&format!("/user-activities?activity_id={}", running))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["activity"]["name"], "Running");
    Ok(())
}

#[tokio::test]
async fn user_activity_requires_existing_activity() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = read(
        app.post("/user-activities", json!({"activity_id": Uuid::new_v4()}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Activity not found");
    assert!(!app.gateway.wrote("user_activities"));
    Ok(())
}

#[tokio::test]
async fn create_plan_returns_inserted_rows() -> Result<()> {
    let app = spawn_app().await?;
    let (_, user_activity_id, _) = app.seed_plan();

    let (status, body) = read(
        app.post("/plans", json!({"user_activity_id": user_activity_id, "name": "Upper Lower"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Upper Lower");
    assert_eq!(rows[0]["user_activity_id"], user_activity_id.to_string());
    assert!(Uuid::parse_str(rows[0]["id"].as_str().unwrap()).is_ok());
    Ok(())
}

#[tokio::test]
async fn create_plan_checks_user_activity_first() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = read(
        app.post("/plans", json!({"user_activity_id": Uuid::new_v4(), "name": "Orphan"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert!(!app.gateway.wrote("plans"));
    Ok(())
}

#[tokio::test]
async fn create_plan_validates_body() -> Result<()> {
    let app = spawn_app().await?;
    let (_, user_activity_id, _) = app.seed_plan();

    let (status, body) = read(
        app.post("/plans", json!({"user_activity_id": user_activity_id, "name": "  "}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["name"], "This field is required");

    let res = app.post("/plans", json!({"name": "No parent"})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post("/plans", json!({"user_activity_id": "not-a-uuid", "name": "Bad"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(!app.gateway.wrote("plans"));
    Ok(())
}

#[tokio::test]
async fn plans_list_filter_and_get() -> Result<()> {
    let app = spawn_app().await?;
    let (_, user_activity_id, plan_id) = app.seed_plan();
    app.gateway.seed(
        "plans",
        json!({"user_activity_id": Uuid::new_v4(), "name": "Someone else's"}),
    );

    let (_, all) = read(app.get("/plans").send().await?).await?;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, filtered) = read(
        app.get(&format!("/plans?user_activity_id={}", user_activity_id))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["id"], plan_id.to_string());

    let res = app.get("/plans?user_activity_id=nope").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (status, plan) = read(app.get(&format!("/plans/{}", plan_id)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["name"], "Push Pull Legs");

    let (status, body) = read(app.get(&format!("/plans/{}", Uuid::new_v4())).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Plan not found");

    let (status, body) = read(app.get("/plans/abc").send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn plan_groups_lists_children() -> Result<()> {
    let app = spawn_app().await?;
    let (_, _, plan_id) = app.seed_plan();
    app.gateway.seed("exercise_groups", json!({"plan_id": plan_id, "name": "Push", "day_of_week": 1}));
    app.gateway.seed("exercise_groups", json!({"plan_id": plan_id, "name": "Pull", "day_of_week": null}));
    app.gateway.seed("exercise_groups", json!({"plan_id": Uuid::new_v4(), "name": "Other"}));

    let (status, groups) = read(app.get(&format!("/plans/{}/groups", plan_id)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["plan_id"] == plan_id.to_string()));

    let res = app.get(&format!("/plans/{}/groups", Uuid::new_v4())).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn backend_failures_map_to_500_and_504() -> Result<()> {
    let app = spawn_app().await?;

    app.gateway.fail("plans", Failure::Rejected);
    let (status, body) = read(app.get("/plans").send().await?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Backend detail stays in the logs
    assert!(!body["message"].as_str().unwrap().contains("foreign key"));

    app.gateway.fail("plans", Failure::Timeout);
    let (status, body) = read(app.get("/plans").send().await?).await?;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "GATEWAY_TIMEOUT");

    app.gateway.fail("activities", Failure::Malformed);
    app.gateway.seed("activities", json!({"name": "Rowing"}));
    let res = app.get("/activities").send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
