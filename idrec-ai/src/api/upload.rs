//! Two-document upload endpoint
//!
//! POST /upload with multipart parts `file1` and `file2`.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{routing::post, Json, Router};

use crate::services::ProcessOutcome;
use crate::{ApiError, ApiResult, AppState};

/// Upper bound for the whole multipart body (two scans)
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const FIRST_PART: &str = "file1";
const SECOND_PART: &str = "file2";

/// POST /upload handler
///
/// **Response:** `{"document_1_details", "document_2_details",
/// "consolidated_details", "similarity_percentage"}`
///
/// **Errors:**
/// - 400 Bad Request: body is not multipart or a file part is missing
/// - 500 Internal Server Error: conversion or extraction failed for either
///   document (no partial result is returned)
pub async fn upload_documents(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProcessOutcome>> {
    let result = async {
        let mut multipart = multipart
            .map_err(|e| ApiError::bad_request(ApiError::PROCESSING_FAILED, e.body_text()))?;
        let (first, second) = read_documents(&mut multipart).await?;

        tracing::info!(
            file1_bytes = first.len(),
            file2_bytes = second.len(),
            "Processing document pair"
        );

        state
            .orchestrator
            .process(&first, &second)
            .await
            .map_err(|e| ApiError::pipeline(ApiError::PROCESSING_FAILED, e))
    }
    .await;

    state.track(result).await.map(Json)
}

/// Collect the two file parts; other parts are ignored
async fn read_documents(multipart: &mut Multipart) -> ApiResult<(Bytes, Bytes)> {
    let mut first = None;
    let mut second = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(ApiError::PROCESSING_FAILED, e.body_text()))?
    {
        let slot = match field.name() {
            Some(FIRST_PART) => &mut first,
            Some(SECOND_PART) => &mut second,
            other => {
                tracing::debug!(part = ?other, "Ignoring unexpected multipart part");
                continue;
            }
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(ApiError::PROCESSING_FAILED, e.body_text()))?;
        *slot = Some(bytes);
    }

    let missing = |name: &str| {
        ApiError::bad_request(
            ApiError::PROCESSING_FAILED,
            format!("missing file part '{}'", name),
        )
    };

    Ok((
        first.ok_or_else(|| missing(FIRST_PART))?,
        second.ok_or_else(|| missing(SECOND_PART))?,
    ))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_documents))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
