//! Compare two already-extracted mappings
//!
//! Skips conversion and extraction; useful when a caller has corrected
//! the extracted fields and wants the reconciliation re-run.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use idrec_common::FieldMapping;
use serde::Deserialize;
use serde_json::Value;

use crate::services::ProcessOutcome;
use crate::{ApiError, ApiResult, AppState, PipelineError};

/// Compare request body
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub document_1: Value,
    pub document_2: Value,
}

fn mapping(document: &'static str, value: Value) -> ApiResult<FieldMapping> {
    FieldMapping::from_json(value).map_err(|source| {
        ApiError::pipeline(
            ApiError::COMPARISON_FAILED,
            PipelineError::Comparison { document, source },
        )
    })
}

/// POST /compare handler
///
/// Responds with the same shape as `/upload`. A side that is not a flat
/// object of scalars is a 400.
pub async fn compare_documents(
    State(state): State<AppState>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessOutcome>> {
    let result = body
        .map_err(|e| ApiError::bad_request(ApiError::COMPARISON_FAILED, e.body_text()))
        .and_then(|Json(request)| {
            let document_1 = mapping("document_1", request.document_1)?;
            let document_2 = mapping("document_2", request.document_2)?;
            Ok(ProcessOutcome::compare(document_1, document_2))
        });

    state.track(result).await.map(Json)
}

/// Build compare routes
pub fn compare_routes() -> Router<AppState> {
    Router::new().route("/compare", post(compare_documents))
}
