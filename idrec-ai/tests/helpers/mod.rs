//! Test Helper Utilities
//!
//! In-process stand-ins for the document converter and the language model,
//! plus a file-backed test database.

#![allow(dead_code)]

use async_trait::async_trait;
use idrec_ai::services::extractor::parse_model_output;
use idrec_ai::services::{
    ConversionError, DocumentConverter, ExtractionError, ExtractionOrchestrator, FieldExtractor,
    PlainTextConverter,
};
use idrec_ai::AppState;
use idrec_common::FieldMapping;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// Treats the document text as the model's JSON answer
pub struct JsonEchoExtractor;

#[async_trait]
impl FieldExtractor for JsonEchoExtractor {
    fn name(&self) -> &'static str {
        "json-echo"
    }

    async fn extract(&self, text: &str) -> Result<FieldMapping, ExtractionError> {
        parse_model_output(text)
    }
}

/// Converter whose backend is always down
pub struct UnavailableConverter;

#[async_trait]
impl DocumentConverter for UnavailableConverter {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn convert(&self, _bytes: &[u8]) -> Result<String, ConversionError> {
        Err(ConversionError::NetworkError(
            "connection refused".to_string(),
        ))
    }
}

/// Create temporary database with schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_idrec.db");
    let pool = idrec_ai::db::init_database_pool(&db_path).await.unwrap();
    (temp_dir, pool)
}

/// App state whose uploads are JSON documents echoed through the extractor
pub async fn test_app_state() -> (TempDir, AppState) {
    let (temp_dir, pool) = create_test_db().await;
    let orchestrator =
        ExtractionOrchestrator::new(Arc::new(PlainTextConverter), Arc::new(JsonEchoExtractor));
    (temp_dir, AppState::new(pool, Arc::new(orchestrator)))
}

/// App state whose converter always fails
pub async fn failing_app_state() -> (TempDir, AppState) {
    let (temp_dir, pool) = create_test_db().await;
    let orchestrator =
        ExtractionOrchestrator::new(Arc::new(UnavailableConverter), Arc::new(JsonEchoExtractor));
    (temp_dir, AppState::new(pool, Arc::new(orchestrator)))
}

pub const BOUNDARY: &str = "idrec-test-boundary";

/// Build a multipart/form-data body from (part name, content) pairs
pub fn multipart_body(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, content) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}.txt\"\r\n",
            name, name
        ));
        body.push_str("Content-Type: text/plain\r\n\r\n");
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body.into_bytes()
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
