//! Server configuration

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),

    #[error("CORS_ORIGIN lists no origins")]
    NoOrigins,

    #[error("CORS_ORIGIN cannot be \"*\" when credentials are allowed")]
    WildcardOrigin,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<HeaderValue>,
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load from `PORT`, `CORS_ORIGIN` and `DATABASE_URL`
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let origins = std::env::var("CORS_ORIGIN")
            .ok()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            port,
            cors_origins: parse_origins(&origins)?,
            database_url,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: vec![HeaderValue::from_static(DEFAULT_CORS_ORIGIN)],
            database_url: None,
        }
    }
}

/// Split a comma-separated origin list
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ServerConfigError> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            if o == "*" {
                return Err(ServerConfigError::WildcardOrigin);
            }
            HeaderValue::from_str(o).map_err(|_| ServerConfigError::InvalidOrigin(o.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(ServerConfigError::NoOrigins);
    }

    Ok(origins)
}
