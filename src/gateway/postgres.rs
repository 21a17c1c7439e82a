use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row as _};
use tracing::{debug, error, info};

use super::postgrest::require_filters;
use super::query::{quote, sql_where, validate_identifier};
use super::{Filter, Gateway, GatewayError, Query, Row};

/// Gateway talking to Postgres directly. Renders the same [`Query`] model to
/// SQL and returns each row as `row_to_json`, so decoding is shared with the
/// PostgREST backend.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
    timeout: Duration,
}

impl PgGateway {
    pub async fn connect(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to connect to Postgres: {}", e)))?;

        info!("Created database pool ({} connections max)", max_connections);
        Ok(Self::from_pool(pool, timeout))
    }

    pub fn from_pool(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn run<F>(&self, table: &str, fut: F) -> Result<Vec<Row>, GatewayError>
    where
        F: Future<Output = Result<Vec<PgRow>, sqlx::Error>>,
    {
        let rows = tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
            .map_err(|e| self.sqlx_error(table, e))?;

        rows.iter()
            .map(|row| {
                let value: Value = row
                    .try_get("row")
                    .map_err(|e| GatewayError::decode(table, e))?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(GatewayError::decode(table, format!("expected object, got {}", other))),
                }
            })
            .collect()
    }

    async fn fetch(&self, table: &str, sql: &str, payload: Option<Value>, params: Vec<String>) -> Result<Vec<Row>, GatewayError> {
        debug!(table, sql, "postgres query");
        let mut q = sqlx::query(sql);
        if let Some(payload) = payload {
            q = q.bind(sqlx::types::Json(payload));
        }
        for p in params {
            q = q.bind(p);
        }
        self.run(table, q.fetch_all(&self.pool)).await
    }

    fn sqlx_error(&self, table: &str, err: sqlx::Error) -> GatewayError {
        match err {
            sqlx::Error::PoolTimedOut => GatewayError::Timeout(self.timeout),
            sqlx::Error::Database(db) => {
                error!(table, code = db.code().as_deref().unwrap_or(""), "Database query error: {}", db.message());
                GatewayError::Query {
                    code: db.code().map(|c| c.into_owned()),
                    message: db.message().to_string(),
                }
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => GatewayError::decode(table, err),
            other => {
                error!(table, "SQLx error: {}", other);
                GatewayError::Transport(other.to_string())
            }
        }
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, GatewayError> {
        query.validate()?;
        let sql = query.to_sql();
        self.fetch(query.table_name(), &sql.query, None, sql.params).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        validate_identifier(table)?;
        let columns = insert_columns(&rows)?;
        let sql = insert_sql(table, &columns);
        let payload = Value::Array(rows.into_iter().map(Value::Object).collect());
        self.fetch(table, &sql, Some(payload), vec![]).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, GatewayError> {
        require_filters(table, filters)?;
        let columns: Vec<String> = patch.keys().cloned().collect();
        if columns.is_empty() {
            return Err(GatewayError::InvalidQuery(format!("update of {} has no fields", table)));
        }
        for column in &columns {
            validate_identifier(column)?;
        }
        let (sql, params) = update_sql(table, &columns, filters);
        self.fetch(table, &sql, Some(Value::Object(patch)), params).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, GatewayError> {
        require_filters(table, filters)?;
        let (where_clause, params) = sql_where("r", filters, 0);
        let sql = format!(
            "DELETE FROM {} AS r {} RETURNING row_to_json(r) AS row",
            quote(table),
            where_clause
        );
        self.fetch(table, &sql, None, params).await
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        tokio::time::timeout(self.timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
            .map_err(|e| self.sqlx_error("health", e))?;
        Ok(())
    }
}

/// Column list for a batch insert, taken from the first row.
///
/// Every row must carry the same keys. A row missing a column would be written
/// as NULL by `jsonb_populate_recordset` instead of taking the column default.
fn insert_columns(rows: &[Row]) -> Result<Vec<String>, GatewayError> {
    let Some(first) = rows.first() else {
        return Ok(vec![]);
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    for column in &columns {
        validate_identifier(column)?;
    }
    let uniform = rows
        .iter()
        .skip(1)
        .all(|row| row.len() == columns.len() && columns.iter().all(|c| row.contains_key(c)));
    if !uniform {
        return Err(GatewayError::InvalidQuery(
            "batch insert rows must share the same columns".to_string(),
        ));
    }
    Ok(columns)
}

/// Typed through `jsonb_populate_recordset` so text/uuid/jsonb columns coerce
/// by the table's own row type.
fn insert_sql(table: &str, columns: &[String]) -> String {
    let table = quote(table);
    if columns.is_empty() {
        return format!("INSERT INTO {} AS r DEFAULT VALUES RETURNING row_to_json(r) AS row", table);
    }
    let cols = columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO {table} AS r ({cols}) SELECT {cols} FROM jsonb_populate_recordset(NULL::{table}, $1) RETURNING row_to_json(r) AS row"
    )
}

fn update_sql(table: &str, columns: &[String], filters: &[Filter]) -> (String, Vec<String>) {
    let table = quote(table);
    let cols = columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
    let (where_clause, params) = sql_where("r", filters, 1);
    (
        format!(
            "UPDATE {table} AS r SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)) {where_clause} RETURNING row_to_json(r) AS row"
        ),
        params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_columns_come_from_the_first_row() {
        let rows = vec![
            row(json!({"name": "Push Day", "user_activity_id": "a"})),
            row(json!({"user_activity_id": "b", "name": "Pull Day"})),
        ];
        let mut columns = insert_columns(&rows).unwrap();
        columns.sort();
        assert_eq!(columns, vec!["name", "user_activity_id"]);

        let bad = vec![row(json!({"name; --": 1}))];
        assert!(insert_columns(&bad).is_err());
    }

    #[test]
    fn mixed_key_batches_are_rejected() {
        let missing = vec![
            row(json!({"name": "Push Day", "notes": "x"})),
            row(json!({"name": "Pull Day"})),
        ];
        assert!(matches!(insert_columns(&missing), Err(GatewayError::InvalidQuery(_))));

        let extra = vec![
            row(json!({"name": "Push Day"})),
            row(json!({"name": "Pull Day", "notes": "x"})),
        ];
        assert!(matches!(insert_columns(&extra), Err(GatewayError::InvalidQuery(_))));

        let renamed = vec![
            row(json!({"name": "Push Day"})),
            row(json!({"title": "Pull Day"})),
        ];
        assert!(insert_columns(&renamed).is_err());
    }

    #[test]
    fn renders_insert_through_populate_recordset() {
        let sql = insert_sql("plans", &["name".to_string(), "user_activity_id".to_string()]);
        assert_eq!(
            sql,
            "INSERT INTO \"plans\" AS r (\"name\", \"user_activity_id\") SELECT \"name\", \"user_activity_id\" FROM jsonb_populate_recordset(NULL::\"plans\", $1) RETURNING row_to_json(r) AS row"
        );
        assert!(insert_sql("plans", &[]).contains("DEFAULT VALUES"));
    }

    #[test]
    fn renders_update_with_offset_placeholders() {
        let (sql, params) = update_sql("users", &["email".to_string()], &[Filter::eq("id", "42")]);
        assert_eq!(
            sql,
            "UPDATE \"users\" AS r SET (\"email\") = (SELECT \"email\" FROM jsonb_populate_record(NULL::\"users\", $1)) WHERE r.\"id\"::text = $2 RETURNING row_to_json(r) AS row"
        );
        assert_eq!(params, vec!["42".to_string()]);
    }
}
