//! HTTP surface: router assembly and the serve loop

pub mod response;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router, ServiceExt,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tower::Layer;
use tower_http::{
    compression::CompressionLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
};
use tracing::info;

use crate::{config::Config, db, features, middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Connect, migrate, and run the server until shutdown
pub async fn serve(config: Config) -> Result<()> {
    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    let shutdown_timeout_secs = config.server.shutdown_timeout_secs;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState { db: pool, config };
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout_secs))
        .await?;

    Ok(())
}

/// Wrap the router so paths resolve with or without a trailing slash
///
/// The web client calls the slash-suffixed forms (`/api/summary/`); both
/// spellings must reach the same handler.
pub fn create_app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(create_router(state))
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let feature_state = features::FeatureState {
        db: state.db.clone(),
        ingest: state.config.ingest.clone(),
    };

    let api = Router::new()
        .route("/", get(api_root))
        .merge(features::router(feature_state));

    // Leave headroom above the upload limit so oversized files reach the
    // ingest validation and produce its error message, not a bare 413.
    let body_limit = state.config.ingest.max_upload_bytes + 64 * 1024;
    let cors = middleware::cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api", api)
        // Innermost: extractor rejections and limit overruns must leave the
        // router as `{"error": ...}` before compression applies.
        .layer(axum::middleware::map_response(middleware::ensure_json_errors))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(cors)
}

/// API root: lists the available endpoints
async fn api_root() -> impl IntoResponse {
    Json(json!({
        "upload": "/api/upload",
        "summary": "/api/summary",
        "history": "/api/history",
        "report": "/api/report/{id}"
    }))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
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

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
