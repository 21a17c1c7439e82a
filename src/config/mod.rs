use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayBackend {
    /// Tables through `{supabase_url}/rest/v1`.
    Postgrest,
    /// Tables through a direct Postgres connection (`DATABASE_URL`).
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub backend: GatewayBackend,
    pub supabase_url: String,
    pub supabase_key: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub audience: Option<String>,
    /// Lifetime of development tokens minted by `trena-api token`.
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.supabase_url).map_err(|e| ConfigError::Invalid {
            key: "SUPABASE_URL",
            message: e.to_string(),
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Preset chosen by `APP_ENV`, then variable overrides, then required checks.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        // Gateway overrides
        if let Some(v) = lookup("GATEWAY_BACKEND") {
            self.gateway.backend = match v.to_ascii_lowercase().as_str() {
                "postgrest" => GatewayBackend::Postgrest,
                "postgres" => GatewayBackend::Postgres,
                other => {
                    return Err(ConfigError::Invalid {
                        key: "GATEWAY_BACKEND",
                        message: format!("expected postgrest or postgres, got {}", other),
                    })
                }
            };
        }
        if let Some(v) = lookup("SUPABASE_URL") {
            self.gateway.supabase_url = v;
        }
        if let Some(v) = lookup("SUPABASE_KEY") {
            self.gateway.supabase_key = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.gateway.database_url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.gateway.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("GATEWAY_TIMEOUT_MS") {
            self.gateway.timeout_ms = parse("GATEWAY_TIMEOUT_MS", &v)?;
        }

        // Auth overrides
        if let Some(v) = lookup("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_AUDIENCE") {
            self.auth.audience = Some(v).filter(|a| !a.is_empty());
        }
        if let Some(v) = lookup("TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = parse("TOKEN_TTL_SECS", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.supabase_url.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_URL"));
        }
        self.gateway.base_url()?;
        if self.gateway.supabase_key.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_KEY"));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_JWT_SECRET"));
        }
        if self.gateway.backend == GatewayBackend::Postgres
            && self.gateway.database_url.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3004,
            },
            gateway: GatewayConfig {
                backend: GatewayBackend::Postgrest,
                supabase_url: String::new(),
                supabase_key: String::new(),
                database_url: None,
                max_connections: 10,
                timeout_ms: 10_000,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                audience: None,
                token_ttl_secs: 3600,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:8081".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: GatewayConfig {
                max_connections: 20,
                timeout_ms: 8_000,
                ..Self::development().gateway
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: GatewayConfig {
                max_connections: 50,
                timeout_ms: 5_000,
                ..Self::development().gateway
            },
            auth: AuthConfig {
                token_ttl_secs: 900,
                ..Self::development().auth
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
            ..Self::development()
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
