#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, TimeZone, Utc};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use trena_api::app;
use trena_api::auth::provider::{Credentials, IdentityProvider, ProviderError, Session};
use trena_api::auth::{Claims, TokenVerifier};
use trena_api::config::AppConfig;
use trena_api::gateway::{Embed, Filter, Gateway, GatewayError, Query, Relation, Row, SortDirection};
use trena_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret-32";
pub const PASSWORD: &str = "correct-horse-battery";
pub const REFRESH_TOKEN: &str = "refresh-token-1";
pub const SLOW_EMAIL: &str = "slow@example.com";

/// How a table configured to fail should fail.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Timeout,
    Rejected,
    Malformed,
}

/// In-memory stand-in for the remote tables. Understands the same query model
/// as the real backends: equality filters, one ordering, limit and embeds.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, Failure>>,
    clock: Mutex<i64>,
}

impl MemoryGateway {
    /// Insert a row directly, assigning `id` if absent. Returns the id.
    pub fn seed(&self, table: &str, value: Value) -> Uuid {
        let mut row = value.as_object().cloned().expect("seed rows are objects");
        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => Uuid::parse_str(id).expect("seeded id is a uuid"),
            None => {
                let id = Uuid::new_v4();
                row.insert("id".into(), json!(id));
                id
            }
        };
        self.tables.lock().unwrap().entry(table.to_string()).or_default().push(row);
        id
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn wrote(&self, table: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| c == &format!("insert:{}", table) || c == &format!("update:{}", table))
    }

    pub fn fail(&self, table: &str, failure: Failure) {
        self.failures.lock().unwrap().insert(table.to_string(), failure);
    }

    fn record(&self, op: &str, table: &str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(format!("{}:{}", op, table));
        match self.failures.lock().unwrap().get(table) {
            None => Ok(()),
            Some(Failure::Timeout) => Err(GatewayError::Timeout(Duration::from_millis(50))),
            Some(Failure::Rejected) => Err(GatewayError::Query {
                code: Some("23503".into()),
                message: format!("insert or update on table \"{}\" violates foreign key constraint", table),
            }),
            Some(Failure::Malformed) => Ok(()),
        }
    }

    fn malformed(&self, table: &str) -> bool {
        matches!(self.failures.lock().unwrap().get(table), Some(Failure::Malformed))
    }

    /// Monotonic timestamps one second apart, so ordering by `created_at` is stable.
    fn next_timestamp(&self) -> String {
        let mut clock = self.clock.lock().unwrap();
        *clock += 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (base + chrono::Duration::seconds(*clock)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn as_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| as_text(row.get(&f.column)).as_deref() == Some(f.value.as_str()))
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

fn nest(tables: &HashMap<String, Vec<Row>>, parent: &Row, embed: &Embed) -> Value {
    let rows = tables.get(embed.table()).map(Vec::as_slice).unwrap_or(&[]);
    let shape = |child: &Row| {
        let mut out = project(child, embed.projection());
        for inner in embed.embeds() {
            out.insert(inner.key().to_string(), nest(tables, child, inner));
        }
        Value::Object(out)
    };

    match embed.relation() {
        Relation::HasMany { foreign_key } => {
            let parent_id = as_text(parent.get("id"));
            Value::Array(
                rows.iter()
                    .filter(|child| as_text(child.get(foreign_key)) == parent_id)
                    .map(shape)
                    .collect(),
            )
        }
        Relation::BelongsTo { foreign_key } => {
            let target = as_text(parent.get(foreign_key));
            rows.iter()
                .find(|child| target.is_some() && as_text(child.get("id")) == target)
                .map(shape)
                .unwrap_or(Value::Null)
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, GatewayError> {
        query.validate()?;
        self.record("select", query.table_name())?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<Row> = tables
            .get(query.table_name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|row| matches(row, query.filters()))
            .cloned()
            .collect();

        if let Some(order) = query.ordering() {
            rows.sort_by(|a, b| as_text(a.get(&order.column)).cmp(&as_text(b.get(&order.column))));
            if order.direction == SortDirection::Desc {
                rows.reverse();
            }
        }
        if let Some(limit) = query.max_rows() {
            rows.truncate(limit as usize);
        }

        let mut out: Vec<Row> = rows
            .iter()
            .map(|row| {
                let mut shaped = project(row, query.projection());
                for embed in query.embeds() {
                    shaped.insert(embed.key().to_string(), nest(&tables, row, embed));
                }
                shaped
            })
            .collect();

        if self.malformed(query.table_name()) {
            for row in &mut out {
                row.insert("id".into(), json!("not-a-uuid"));
            }
        }
        Ok(out)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        self.record("insert", table)?;
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
            row.entry("created_at").or_insert_with(|| json!(self.next_timestamp()));
            stored.push(row);
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, GatewayError> {
        self.record("update", table)?;
        let mut tables = self.tables.lock().unwrap();
        let mut updated = vec![];
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if matches(row, filters) {
                row.extend(patch.clone());
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, GatewayError> {
        self.record("delete", table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let (removed, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|row| matches(row, filters));
        *rows = kept;
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        self.record("health", "health")
    }
}

/// Identity provider double: one password, one refresh token, one email that times out.
pub struct FakeIdentity {
    tokens: Arc<TokenVerifier>,
}

impl FakeIdentity {
    fn session(&self, email: &str) -> Result<Session, ProviderError> {
        let claims = Claims::new(Uuid::new_v4(), email, Some("authenticated".into()), 3600);
        let access_token = self
            .tokens
            .issue(&claims)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Session {
            access_token,
            refresh_token: REFRESH_TOKEN.to_string(),
            expires_in: 3600,
        })
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, ProviderError> {
        if credentials.email == SLOW_EMAIL {
            return Err(ProviderError::Timeout(Duration::from_millis(50)));
        }
        if credentials.email.starts_with("taken") {
            return Err(ProviderError::Rejected {
                status: 422,
                message: "User already registered".into(),
            });
        }
        Ok(json!({
            "user": { "id": Uuid::new_v4(), "email": credentials.email },
            "session": null
        }))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        if credentials.email == SLOW_EMAIL {
            return Err(ProviderError::Timeout(Duration::from_millis(50)));
        }
        if credentials.password != PASSWORD {
            return Err(ProviderError::Rejected {
                status: 400,
                message: "Invalid login credentials".into(),
            });
        }
        self.session(&credentials.email)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        if refresh_token != REFRESH_TOKEN {
            return Err(ProviderError::Rejected {
                status: 400,
                message: "Invalid Refresh Token".into(),
            });
        }
        self.session("refreshed@example.com")
    }
}

/// A running server on a free port, plus handles to its doubles.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub gateway: Arc<MemoryGateway>,
    pub tokens: Arc<TokenVerifier>,
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

pub async fn spawn_app() -> Result<TestApp> {
    let gateway = Arc::new(MemoryGateway::default());
    let tokens = Arc::new(TokenVerifier::new(JWT_SECRET, None));
    let identity = Arc::new(FakeIdentity { tokens: tokens.clone() });
    let state = AppState::new(gateway.clone(), identity, tokens.clone());
    let router = app::router(state, &AppConfig::development().security);

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let user_id = Uuid::new_v4();
    let email = "ana@example.com".to_string();
    let token = tokens.issue(&Claims::new(user_id, email.clone(), Some("authenticated".into()), 3600))?;

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        gateway,
        tokens,
        user_id,
        email,
        token,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token for some other user, signed with the server's secret.
    pub fn token_for(&self, user_id: Uuid, email: &str) -> String {
        self.tokens
            .issue(&Claims::new(user_id, email, None, 3600))
            .expect("token signs")
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.token)
    }

    pub fn post(&self, path: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.token).json(&body)
    }

    pub fn put(&self, path: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(&self.token).json(&body)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(&self.token)
    }

    /// activity -> user activity -> plan, owned by the default user.
    pub fn seed_plan(&self) -> (Uuid, Uuid, Uuid) {
        let activity_id = self.gateway.seed("activities", json!({"name": "Strength"}));
        let user_activity_id = self.gateway.seed(
            "user_activities",
            json!({"user_id": self.user_id, "activity_id": activity_id}),
        );
        let plan_id = self.gateway.seed(
            "plans",
            json!({"user_activity_id": user_activity_id, "name": "Push Pull Legs"}),
        );
        (activity_id, user_activity_id, plan_id)
    }

    pub fn seed_exercise(&self, name: &str) -> Uuid {
        self.gateway.seed(
            "exercises",
            json!({"name": name, "description": null, "tracking_type": "weight_reps", "category_id": null}),
        )
    }
}

/// Status plus parsed JSON body (Null for empty bodies).
pub async fn read(res: Response) -> Result<(reqwest::StatusCode, Value)> {
    let status = res.status();
    let bytes = res.bytes().await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", String::from_utf8_lossy(&bytes)))?
    };
    Ok((status, body))
}
