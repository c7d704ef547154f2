//! HTTP server exposing the store registry.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc, time::Instant};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::{
    error::ApiError,
    middleware::{
        create_body_limit_layer, create_cors_layer, create_panic_layer, create_timeout_layer,
        request_logging_middleware,
    },
    model::Store,
    openapi,
    registry::StoreRegistry,
    settings::Settings,
};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StoreRegistry>,
    pub settings: Arc<Settings>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, Arc::new(StoreRegistry::new()))
    }

    pub fn with_registry(settings: Settings, registry: Arc<StoreRegistry>) -> Self {
        Self {
            registry,
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store_count: usize,
}

/// Query string of `GET /stores`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub filter: String,
}

/// Create the HTTP router with all endpoints and middleware
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let security = &state.settings.security;

    let timeout_layer = create_timeout_layer(server.request_timeout_seconds);
    let body_limit_layer = create_body_limit_layer(security.max_request_size_mb);
    let cors_layer = create_cors_layer(security);

    Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_document))
        .route("/stores", get(list_stores).post(create_store))
        .route("/stores/:id", get(read_store))
        .with_state(state.clone())
        // innermost first: panics are caught before the logger sees the response
        .layer(create_panic_layer())
        .layer(timeout_layer)
        // size is enforced by `body_limit_layer` alone, not axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(body_limit_layer)
        .layer(cors_layer)
        .layer(middleware::from_fn(request_logging_middleware))
}

/// Health check endpoint
#[instrument(skip(state))]
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store_count: state.registry.len(),
    })
}

async fn openapi_document() -> Json<serde_json::Value> {
    Json(openapi::document())
}

/// List stores whose name contains `filter`
#[instrument(skip(state))]
async fn list_stores(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Store>> {
    Json(state.registry.list(&params.filter))
}

/// Create a store; the generated id is returned in `Location`
#[instrument(skip(state, payload))]
async fn create_store(
    State(state): State<AppState>,
    payload: Result<Json<Store>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(store) = payload?;
    let (id, stored) = state.registry.create(store);
    info!("Created store {} ({})", id, stored.name);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/stores/{}", id))],
        Json(stored),
    ))
}

/// Read a single store by id
#[instrument(skip(state))]
async fn read_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Store>, ApiError> {
    Ok(Json(state.registry.read(&id)?))
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = settings.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", listener.local_addr()?);

    run(listener, AppState::new(settings), wait_for_shutdown()).await
}

/// Serve `state` on an already bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        }
    }
}
