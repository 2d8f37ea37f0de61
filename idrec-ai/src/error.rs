//! Error types for idrec-ai
//!
//! [`PipelineError`] is the failure taxonomy of one request; [`ApiError`]
//! adds the endpoint label and renders `{"error", "detail"}` bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use idrec_common::fields::MappingError;
use serde_json::json;
use thiserror::Error;

use crate::services::{ConversionError, ExtractionError};

/// Request-level failure taxonomy
///
/// None of these are retried. Unparseable dates are not errors and never
/// show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Document could not be turned into text
    #[error("document {document}: conversion failed: {source}")]
    Conversion {
        document: usize,
        #[source]
        source: ConversionError,
    },

    /// Extractor failed or returned something that is not a field mapping
    #[error("document {document}: extraction failed: {source}")]
    Extraction {
        document: usize,
        #[source]
        source: ExtractionError,
    },

    /// Caller-supplied mapping was malformed
    #[error("{document}: {source}")]
    Comparison {
        document: &'static str,
        #[source]
        source: MappingError,
    },

    /// Record store failure
    #[error("{0}")]
    Persistence(#[from] idrec_common::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be understood (400)
    #[error("{error}: {detail}")]
    BadRequest { error: &'static str, detail: String },

    /// Pipeline failure (400 for a malformed comparison, 500 otherwise)
    #[error("{error}: {source}")]
    Pipeline {
        error: &'static str,
        #[source]
        source: PipelineError,
    },
}

impl ApiError {
    pub const PROCESSING_FAILED: &'static str = "Processing failed";
    pub const SAVE_FAILED: &'static str = "Failed to save";
    pub const FETCH_FAILED: &'static str = "Failed to fetch records";
    pub const COMPARISON_FAILED: &'static str = "Comparison failed";

    pub fn bad_request(error: &'static str, detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error,
            detail: detail.into(),
        }
    }

    pub fn pipeline(error: &'static str, source: impl Into<PipelineError>) -> Self {
        ApiError::Pipeline {
            error,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Pipeline { source, .. } => match source {
                PipelineError::Comparison { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Human-readable detail string for the response body
    pub fn detail(&self) -> String {
        match self {
            ApiError::BadRequest { detail, .. } => detail.clone(),
            ApiError::Pipeline { source, .. } => source.to_string(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::BadRequest { error, .. } | ApiError::Pipeline { error, .. } => error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.label(),
            "detail": self.detail(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use idrec_common::FieldName;

    #[test]
    fn test_status_mapping() {
        let conversion = ApiError::pipeline(
            ApiError::PROCESSING_FAILED,
            PipelineError::Conversion {
                document: 2,
                source: ConversionError::EmptyDocument,
            },
        );
        assert_eq!(conversion.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(conversion.detail(), "document 2: conversion failed: Document is empty");

        let invalid_age = ApiError::bad_request(
            ApiError::SAVE_FAILED,
            "Invalid age: 'x' is not a whole number",
        );
        assert_eq!(invalid_age.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(invalid_age, ApiError::BadRequest { .. }));

        let store = ApiError::pipeline(
            ApiError::SAVE_FAILED,
            idrec_common::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
        );
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Anything the store reports is a server-side failure
        let store_rejected = ApiError::pipeline(
            ApiError::SAVE_FAILED,
            idrec_common::Error::invalid_field(FieldName::Age, "rejected by store"),
        );
        assert_eq!(store_rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = ApiError::bad_request(ApiError::PROCESSING_FAILED, "missing file2");
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Processing failed: missing file2");
    }
}
