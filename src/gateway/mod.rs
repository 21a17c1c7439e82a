//! Data access gateway.
//!
//! Handlers never talk to the backing store directly. They build a [`Query`]
//! (table, equality filters, ordering, embeds) or a row payload and hand it to
//! a [`Gateway`], which returns untyped JSON rows. [`Repository`] decodes those
//! rows into typed entities.

pub mod postgres;
pub mod postgrest;
pub mod query;
pub mod repository;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use postgres::PgGateway;
pub use postgrest::PostgrestGateway;
pub use query::{Embed, Filter, Order, Query, Relation, SortDirection};
pub use repository::{Entity, Repository};

/// One row as returned by the backend: a JSON object keyed by column (and embed) name.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The backend understood the request and refused it (constraint, bad column, ...).
    #[error("Query rejected: {message}")]
    Query { code: Option<String>, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Rows came back but did not match the expected shape.
    #[error("Failed to decode {table} rows: {message}")]
    Decode { table: String, message: String },

    #[error("{0} not found")]
    NotFound(String),
}

impl GatewayError {
    pub fn decode(table: impl Into<String>, err: impl std::fmt::Display) -> Self {
        GatewayError::Decode {
            table: table.into(),
            message: err.to_string(),
        }
    }
}

/// Remote table operations. Implementations must be cheap to share across
/// request tasks; the application holds a single `Arc<dyn Gateway>`.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, GatewayError>;

    /// Insert rows and return their stored representation.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError>;

    /// Apply `patch` to every row matching `filters`; returns the updated rows.
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, GatewayError>;

    /// Delete rows matching `filters` (at least one is required); returns the deleted rows.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, GatewayError>;

    async fn health_check(&self) -> Result<(), GatewayError>;
}

/// Converts a serialized payload into a row, rejecting anything but a JSON object.
pub fn to_row(table: &str, value: Value) -> Result<Row, GatewayError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::InvalidQuery(format!(
            "{} payload must be a JSON object, got {}",
            table, other
        ))),
    }
}
