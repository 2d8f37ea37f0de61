//! GET /health
//!
//! Reports the configured extraction pipeline and whether the record store
//! still answers. A dead store reports "degraded" but still returns 200 so
//! the uptime and last error stay readable.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::config::MODULE_NAME;
use crate::AppState;

/// Extraction backends in use
#[derive(Debug, Serialize)]
pub struct PipelineInfo {
    pub converter: &'static str,
    pub extractor: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the record store does not answer
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub pipeline: PipelineInfo,
    pub record_store: &'static str,
    /// Last failed request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

async fn record_store_reachable(db: &SqlitePool) -> bool {
    match sqlx::query("SELECT 1").execute(db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Record store health check failed");
            false
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    let store_ok = record_store_reachable(&state.db).await;

    Json(HealthResponse {
        status: if store_ok { "ok" } else { "degraded" },
        module: MODULE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        pipeline: PipelineInfo {
            converter: state.orchestrator.converter_name(),
            extractor: state.orchestrator.extractor_name(),
        },
        record_store: if store_ok { "reachable" } else { "unreachable" },
        last_error: state.last_error.read().await.clone(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
