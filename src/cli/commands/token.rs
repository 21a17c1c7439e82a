use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{Claims, TokenVerifier};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id)")]
    pub sub: Uuid,

    #[arg(long, help = "Email claim")]
    pub email: String,

    #[arg(long, help = "Role claim", default_value = "authenticated")]
    pub role: String,

    #[arg(long, help = "Lifetime in seconds (defaults to TOKEN_TTL_SECS)")]
    pub ttl: Option<i64>,
}

/// Signs with the same secret (and audience, if configured) the server verifies against.
pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let ttl = args.ttl.unwrap_or(config.auth.token_ttl_secs);
    let mut claims = Claims::new(args.sub, args.email, Some(args.role), ttl);
    if let Some(audience) = &config.auth.audience {
        claims = claims.with_audience(audience.clone());
    }

    let tokens = TokenVerifier::new(&config.auth.jwt_secret, config.auth.audience.as_deref());
    let token = tokens.issue(&claims).context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "access_token": token, "token_type": "bearer", "expires_in": ttl })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
