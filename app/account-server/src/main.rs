//! # Account Server
//!
//! Standalone HTTP server for email/password accounts. Exposes:
//! - `GET /health` - liveness check
//! - `POST /auth/signup` - register and receive a token
//! - `POST /auth/login` - exchange credentials for a token
//! - `GET /me` - profile of the bearer of a valid token
//!
//! Configuration comes from the environment, optionally seeded from a `.env`
//! file: `PORT`, `CORS_ORIGIN` and `DATABASE_URL` here, plus the auth
//! settings documented on `account_auth::AuthConfig`. `RUST_LOG` controls
//! log verbosity (default `info`).

mod config;
mod server;

use account_auth::AuthConfig;
use config::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    tracing::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let auth_config = AuthConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    server::start(auth_config, server_config).await
}
