//! Confirmed record endpoints
//!
//! POST /save stores a user-confirmed field mapping, GET /display lists
//! everything saved so far (newest first).

use axum::extract::rejection::JsonRejection;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use idrec_common::{FieldMapping, IdentityRecord};
use serde::Serialize;

use crate::db::identity_cards::{insert_identity_record, list_identity_records, StoredIdentityRecord};
use crate::{ApiError, ApiResult, AppState};

/// Save response
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
}

/// POST /save handler
///
/// **Request:** flat JSON object keyed by field name; unknown keys ignored
///
/// **Response:** `{"status": "success"}`
///
/// **Errors:**
/// - 400 Bad Request: body is not a JSON object or a value cannot be coerced
/// - 500 Internal Server Error: record store failure
pub async fn save_record(
    State(state): State<AppState>,
    body: Result<Json<FieldMapping>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let result = async {
        let Json(submission) =
            body.map_err(|e| ApiError::bad_request(ApiError::SAVE_FAILED, e.body_text()))?;

        // Coercion failures are caller input, not store failures
        let record = IdentityRecord::from_submission(&submission)
            .map_err(|e| ApiError::bad_request(ApiError::SAVE_FAILED, e.to_string()))?;

        insert_identity_record(&state.db, &record)
            .await
            .map_err(|e| ApiError::pipeline(ApiError::SAVE_FAILED, e))?;

        Ok(SaveResponse { status: "success" })
    }
    .await;

    state.track(result).await.map(Json)
}

/// GET /display handler
pub async fn display_records(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<StoredIdentityRecord>>> {
    let result = list_identity_records(&state.db)
        .await
        .map_err(|e| ApiError::pipeline(ApiError::FETCH_FAILED, e));

    state.track(result).await.map(Json)
}

/// Build record routes
pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(save_record))
        .route("/display", get(display_records))
}
