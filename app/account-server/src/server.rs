//! HTTP server: store selection, CORS, and the listener loop.

use crate::config::ServerConfig;

use account_auth::{create_routes, AccountService, AuthConfig, MemoryUserStore, PgUserStore, UserStore};
use anyhow::Context;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS policy for the configured origins, with credentials allowed
pub fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Answer every OPTIONS request with an empty 204, keeping the CORS headers
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let response = next.run(request).await;

    if !is_options {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}

/// Account routes wrapped in the CORS and tracing layers
pub fn build_app(service: Arc<AccountService>, origins: &[HeaderValue]) -> Router {
    create_routes(service)
        .layer(cors_layer(origins))
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgUserStore::connect(url)
                .await
                .context("Failed to connect to DATABASE_URL")?;
            store.migrate().await.context("Failed to migrate user store")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set. Accounts are kept in memory and lost on restart.");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

/// Start the server and run until Ctrl+C or SIGTERM
pub async fn start(auth_config: AuthConfig, config: ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let service = AccountService::new(store, &auth_config).context("Invalid auth configuration")?;

    let app = build_app(Arc::new(service), &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("API listening on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
