use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{to_row, Filter, Gateway, GatewayError, Query, Row};

/// A record type backed by one remote table.
pub trait Entity: DeserializeOwned + Send + 'static {
    const TABLE: &'static str;

    /// Human-readable name used in not-found messages.
    const NAME: &'static str;

    /// Base read for this shape. Joined shapes override this to add their embeds.
    fn query() -> Query {
        Query::table(Self::TABLE)
    }
}

/// Typed access to one entity through the shared gateway.
pub struct Repository<T> {
    gateway: Arc<dyn Gateway>,
    _phantom: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(&self, query: Query) -> Result<Vec<T>, GatewayError> {
        let rows = self.gateway.select(&query).await?;
        decode_rows(T::TABLE, rows)
    }

    pub async fn select_one(&self, query: Query) -> Result<Option<T>, GatewayError> {
        Ok(self.select_any(query.limit(1)).await?.into_iter().next())
    }

    /// By-id read; zero rows is `NotFound`, never an empty success.
    pub async fn select_404(&self, id: Uuid) -> Result<T, GatewayError> {
        self.select_one(T::query().eq("id", id))
            .await?
            .ok_or_else(|| GatewayError::NotFound(T::NAME.to_string()))
    }

    /// Like `select_404` but with extra equality constraints (e.g. ownership).
    pub async fn select_404_where(&self, id: Uuid, filters: Vec<Filter>) -> Result<T, GatewayError> {
        let query = filters
            .into_iter()
            .fold(T::query().eq("id", id), |q, f| q.eq(f.column, f.value));
        self.select_one(query)
            .await?
            .ok_or_else(|| GatewayError::NotFound(T::NAME.to_string()))
    }

    pub async fn insert<P: Serialize>(&self, payload: &P) -> Result<Vec<T>, GatewayError> {
        let rows = match serialize(T::TABLE, payload)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| to_row(T::TABLE, item))
                .collect::<Result<Vec<Row>, _>>()?,
            value => vec![to_row(T::TABLE, value)?],
        };
        let inserted = self.gateway.insert(T::TABLE, rows).await?;
        decode_rows(T::TABLE, inserted)
    }

    /// Inserts a single row and returns its echoed representation.
    pub async fn insert_one<P: Serialize>(&self, payload: &P) -> Result<T, GatewayError> {
        self.insert(payload)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Query {
                code: None,
                message: format!("insert into {} returned no rows", T::TABLE),
            })
    }

    pub async fn update<P: Serialize>(&self, id: Uuid, patch: &P) -> Result<T, GatewayError> {
        let patch = to_row(T::TABLE, serialize(T::TABLE, patch)?)?;
        if patch.is_empty() {
            return Err(GatewayError::InvalidQuery(format!(
                "update of {} has no fields",
                T::TABLE
            )));
        }
        let rows = self
            .gateway
            .update(T::TABLE, &[Filter::eq("id", id)], patch)
            .await?;
        decode_rows::<T>(T::TABLE, rows)?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(T::NAME.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<T, GatewayError> {
        let rows = self.gateway.delete(T::TABLE, &[Filter::eq("id", id)]).await?;
        decode_rows::<T>(T::TABLE, rows)?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(T::NAME.to_string()))
    }
}

pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(|e| GatewayError::decode(table, e)))
        .collect()
}

fn serialize<P: Serialize>(table: &str, payload: &P) -> Result<Value, GatewayError> {
    serde_json::to_value(payload)
        .map_err(|e| GatewayError::InvalidQuery(format!("cannot serialize {} payload: {}", table, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        id: Uuid,
        name: String,
    }

    #[test]
    fn decode_failure_is_distinguishable() {
        let good = json!({"id": Uuid::new_v4(), "name": "Bench"});
        let bad = json!({"id": "not-a-uuid", "name": "Bench"});

        let rows: Vec<Row> = vec![good.as_object().cloned().unwrap()];
        let decoded = decode_rows::<Sample>("exercises", rows).unwrap();
        assert_eq!(decoded[0].name, "Bench");

        let rows: Vec<Row> = vec![bad.as_object().cloned().unwrap()];
        let err = decode_rows::<Sample>("exercises", rows).unwrap_err();
        assert!(matches!(err, GatewayError::Decode { ref table, .. } if table == "exercises"));
    }
}
