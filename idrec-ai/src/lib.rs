//! idrec-ai library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult, PipelineError};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::ExtractionOrchestrator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store connection pool
    pub db: SqlitePool,
    /// Converter + extractor pipeline for uploads
    pub orchestrator: Arc<ExtractionOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, orchestrator: Arc<ExtractionOrchestrator>) -> Self {
        Self {
            db,
            orchestrator,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember a failed request's error for `/health`
    pub async fn track<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(err) = &result {
            *self.last_error.write().await = Some(err.to_string());
        }
        result
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::upload_routes())
        .merge(api::record_routes())
        .merge(api::compare_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // Browser frontends are served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
