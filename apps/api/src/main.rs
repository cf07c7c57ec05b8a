mod auth;
mod config;
mod db;
mod errors;
mod roasts;
mod routes;
mod state;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageKind};
use crate::db::{create_pool, run_migrations};
use crate::roasts::errors::RoastError;
use crate::roasts::service::EntryService;
use crate::roasts::storage::{MemoryStorage, PgStorage, StorageBackend};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roast API v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app_env);
    if config.dev_auth_active() {
        warn!("Development authentication bypass is enabled");
    }

    let storage = build_storage(&config).await?;
    let roasts = EntryService::new(storage, config.calendar_zone);
    info!("Calendar zone: {:?}", config.calendar_zone);

    let cors = build_cors(&config);
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let state = AppState {
        config: Arc::new(config),
        roasts: Arc::new(roasts),
    };

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Listening on {addr}");
    info!("Health check available at http://{addr}/health");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Picks the storage backend once, at startup. A Postgres backend without a
/// `DATABASE_URL` is fatal.
async fn build_storage(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    let storage: Arc<dyn StorageBackend> = match config.storage {
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
        StorageKind::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                RoastError::Unconfigured(
                    "DATABASE_URL must be set when STORAGE_BACKEND=postgres".to_string(),
                )
            })?;
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgStorage::new(pool))
        }
    };
    Ok(storage)
}

fn build_cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received: closing HTTP server"),
        _ = terminate => info!("SIGTERM received: closing HTTP server"),
    }
}
