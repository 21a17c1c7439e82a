use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use super::query::{postgrest_filters, validate_filters, validate_identifier};
use super::{Filter, Gateway, GatewayError, Query, Row};

/// Gateway backed by a PostgREST endpoint (`{base}/rest/v1/{table}`), authenticated
/// with the project's service key.
#[derive(Clone)]
pub struct PostgrestGateway {
    http: reqwest::Client,
    rest_url: Url,
    api_key: String,
    timeout: Duration,
}

/// PostgREST error body: `{"code": "...", "message": "...", "details": ..., "hint": ...}`.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestGateway {
    pub fn new(base_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let rest_url = with_trailing_slash(base_url)
            .join("rest/v1/")
            .map_err(|e| GatewayError::Transport(format!("invalid PostgREST URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            rest_url,
            api_key: api_key.into(),
            timeout,
        })
    }

    fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, GatewayError> {
        validate_identifier(table)?;
        let url = self
            .rest_url
            .join(table)
            .map_err(|e| GatewayError::InvalidQuery(e.to_string()))?;

        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key))
    }

    fn writing(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", HeaderValue::from_static("return=representation"))
    }

    async fn execute(&self, table: &str, builder: RequestBuilder) -> Result<Vec<Row>, GatewayError> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(query_error(table, status, &body));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(vec![]);
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice::<Vec<Row>>(&bytes).map_err(|e| GatewayError::decode(table, e))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Gateway for PostgrestGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, GatewayError> {
        query.validate()?;
        let params = query.to_postgrest_params();
        debug!(table = query.table_name(), ?params, "postgrest select");

        let builder = self.request(Method::GET, query.table_name())?.query(&params);
        self.execute(query.table_name(), builder).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let builder = self.writing(self.request(Method::POST, table)?).json(&rows);
        self.execute(table, builder).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, GatewayError> {
        require_filters(table, filters)?;
        let builder = self
            .writing(self.request(Method::PATCH, table)?)
            .query(&postgrest_filters(filters))
            .json(&patch);
        self.execute(table, builder).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, GatewayError> {
        require_filters(table, filters)?;
        let builder = self
            .writing(self.request(Method::DELETE, table)?)
            .query(&postgrest_filters(filters));
        self.execute(table, builder).await
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        let response = self
            .http
            .get(self.rest_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Transport(format!(
                "PostgREST health check returned {}",
                response.status()
            )))
        }
    }
}

pub(crate) fn require_filters(table: &str, filters: &[Filter]) -> Result<(), GatewayError> {
    if filters.is_empty() {
        return Err(GatewayError::InvalidQuery(format!(
            "refusing unfiltered write on {}",
            table
        )));
    }
    validate_identifier(table)?;
    validate_filters(filters)
}

fn query_error(table: &str, status: StatusCode, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<PostgrestErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| body.to_string());

    error!(
        table,
        %status,
        code = code.as_deref().unwrap_or(""),
        details = parsed.as_ref().and_then(|b| b.details.as_deref()).unwrap_or(""),
        "PostgREST request failed: {}",
        message
    );

    GatewayError::Query { code, message }
}

/// `Url::join` replaces the last path segment unless the base ends with `/`.
pub(crate) fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_url_keeps_base_path() {
        let base = Url::parse("http://localhost:54321/project").unwrap();
        let gateway = PostgrestGateway::new(&base, "key", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.rest_url.as_str(), "http://localhost:54321/project/rest/v1/");

        let base = Url::parse("https://abc.supabase.co").unwrap();
        let gateway = PostgrestGateway::new(&base, "key", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.rest_url.as_str(), "https://abc.supabase.co/rest/v1/");
    }

    #[test]
    fn unfiltered_writes_are_refused() {
        assert!(matches!(
            require_filters("users", &[]),
            Err(GatewayError::InvalidQuery(_))
        ));
        assert!(require_filters("users", &[Filter::eq("id", "x")]).is_ok());
    }

    #[test]
    fn query_error_prefers_postgrest_message() {
        let err = query_error(
            "plans",
            StatusCode::CONFLICT,
            r#"{"code":"23503","message":"violates foreign key constraint","details":null,"hint":null}"#,
        );
        match err {
            GatewayError::Query { code, message } => {
                assert_eq!(code.as_deref(), Some("23503"));
                assert_eq!(message, "violates foreign key constraint");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
