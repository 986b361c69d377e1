//! HTTP surface: router assembly, health checks and the server loop

pub mod extract;
pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{signal, sync::oneshot};
use tower_http::{compression::CompressionLayer, services::ServeDir};
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::features::{self, FeatureState};
use crate::middleware;
use crate::storage::MediaStorage;
use crate::store::{MemoryStore, SharedStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub media: MediaStorage,
}

/// Connect the configured store and media backends
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store: SharedStore = match config.store {
        StoreBackend::Postgres => Arc::new(db::connect_store(&config.database).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        },
    };
    info!(backend = store.backend(), "Store initialized");

    let media = MediaStorage::new(config.media.clone()).await?;
    info!(backend = ?config.media.backend, "Media storage initialized");

    Ok(AppState { store, media })
}

/// Build the state, bind and serve until a shutdown signal arrives
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (started_tx, started_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = started_tx.send(());
        })
        .into_future();
    let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    tokio::select! {
        result = server => {
            result?;
            info!("Server shut down gracefully");
        },
        _ = shutdown_deadline(started_rx, timeout) => {
            tracing::warn!(
                timeout_secs = config.server.shutdown_timeout_secs,
                "Connections still open after shutdown timeout, exiting"
            );
        },
    }

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_routes = features::router(FeatureState {
        store: state.store.clone(),
        media: state.media.clone(),
    });

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state.store.clone())
        .nest("/api/v1", feature_routes);

    // Only a path-style MEDIA_URL can be served from here; an absolute URL
    // points at a CDN or bucket that serves the files itself
    if let Some(root) = state.media.local_root() {
        let prefix = config.media.url.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            router = router.nest_service(prefix, ServeDir::new(root));
        }
    }

    // Apply layers from innermost to outermost
    router
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Herdbook Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check handler
async fn health_check(State(store): State<SharedStore>) -> Response {
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": store.backend()
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "store": store.backend()
                })),
            )
                .into_response()
        },
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

/// Resolves `timeout` after shutdown has started
///
/// Never resolves when the sender is dropped unsent, i.e. when the server
/// stopped without a shutdown signal.
async fn shutdown_deadline(started: oneshot::Receiver<()>, timeout: Duration) {
    if started.await.is_err() {
        return std::future::pending().await;
    }
    info!("Waiting up to {} seconds for connections to close", timeout.as_secs());
    tokio::time::sleep(timeout).await;
}
