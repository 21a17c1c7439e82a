use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::auth::provider::{GoTrueClient, IdentityProvider};
use crate::auth::TokenVerifier;
use crate::config::{AppConfig, GatewayBackend};
use crate::gateway::{Entity, Gateway, PgGateway, PostgrestGateway, Repository};

/// Shared application state, built once at startup and cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        identity: Arc<dyn IdentityProvider>,
        tokens: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            gateway,
            identity,
            tokens,
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let base_url = config.gateway.base_url()?;
        let timeout = config.gateway.timeout();

        let gateway: Arc<dyn Gateway> = match config.gateway.backend {
            GatewayBackend::Postgrest => {
                info!("Using PostgREST gateway at {}", base_url);
                Arc::new(
                    PostgrestGateway::new(&base_url, &config.gateway.supabase_key, timeout)
                        .context("failed to build PostgREST client")?,
                )
            }
            GatewayBackend::Postgres => {
                let database_url = config
                    .gateway
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;
                info!("Using direct Postgres gateway");
                Arc::new(
                    PgGateway::connect(database_url, config.gateway.max_connections, timeout)
                        .await
                        .context("failed to connect to Postgres")?,
                )
            }
        };

        let identity = GoTrueClient::new(&base_url, &config.gateway.supabase_key, timeout)
            .context("failed to build GoTrue client")?;
        let tokens = TokenVerifier::new(&config.auth.jwt_secret, config.auth.audience.as_deref());

        Ok(Self::new(gateway, Arc::new(identity), Arc::new(tokens)))
    }

    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.gateway.clone())
    }
}
