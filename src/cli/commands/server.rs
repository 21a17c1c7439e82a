use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::app;
use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Bind host (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Bind port (overrides PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Trena API in {:?} mode", config.environment);
    if config.is_development() {
        info!(backend = ?config.gateway.backend, url = %config.gateway.supabase_url, "Gateway target");
    }

    let state = AppState::from_config(&config).await?;
    let app = app::router(state, &config.security);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Trena API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
