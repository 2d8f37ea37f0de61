//! Document-to-text converters
//!
//! The converter turns an uploaded scan (PDF or image) into plain text or
//! markdown for the field extractor. Three backends are available:
//! - [`DoclingServeConverter`]: docling-serve HTTP API
//! - [`CommandConverter`]: external program run on a temporary copy
//! - [`PlainTextConverter`]: UTF-8 text taken as-is

use async_trait::async_trait;
use idrec_common::config::{ConverterConfig, ConverterKind};
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Converter errors
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Document is not valid UTF-8 text")]
    NotText,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Converter API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Converter program failed: {0}")]
    CommandFailed(String),

    #[error("Converter misconfigured: {0}")]
    Misconfigured(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Document → text collaborator
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Converter name for logs
    fn name(&self) -> &'static str;

    /// Convert raw document bytes to text
    async fn convert(&self, document: &[u8]) -> Result<String, ConversionError>;
}

/// Build the converter selected in configuration
pub fn converter_from_config(
    config: &ConverterConfig,
) -> Result<Arc<dyn DocumentConverter>, ConversionError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let converter: Arc<dyn DocumentConverter> = match config.kind {
        ConverterKind::DoclingServe => Arc::new(DoclingServeConverter::new(&config.url, timeout)?),
        ConverterKind::Command => {
            let program = config.command.clone().ok_or_else(|| {
                ConversionError::Misconfigured(
                    "converter.kind = \"command\" requires converter.command".to_string(),
                )
            })?;
            Arc::new(CommandConverter::new(program, config.args.clone(), timeout))
        }
        ConverterKind::PlainText => Arc::new(PlainTextConverter),
    };
    Ok(converter)
}

/// File extension and MIME type sniffed from content, PDF when unknown
fn sniff_document_type(document: &[u8]) -> (&'static str, &'static str) {
    infer::get(document)
        .map(|kind| (kind.extension(), kind.mime_type()))
        .unwrap_or(("pdf", "application/pdf"))
}

// ============================================================================
// docling-serve
// ============================================================================

#[derive(Debug, Deserialize)]
struct DoclingResponse {
    document: DoclingDocument,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DoclingDocument {
    md_content: Option<String>,
}

/// Converter backed by a docling-serve instance
pub struct DoclingServeConverter {
    http_client: reqwest::Client,
    base_url: String,
}

impl DoclingServeConverter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConversionError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConversionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentConverter for DoclingServeConverter {
    fn name(&self) -> &'static str {
        "docling-serve"
    }

    async fn convert(&self, document: &[u8]) -> Result<String, ConversionError> {
        if document.is_empty() {
            return Err(ConversionError::EmptyDocument);
        }

        let (extension, mime) = sniff_document_type(document);
        let part = reqwest::multipart::Part::bytes(document.to_vec())
            .file_name(format!("document.{}", extension))
            .mime_str(mime)
            .map_err(|e| ConversionError::NetworkError(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("to_formats", "md")
            .part("files", part);

        let url = format!("{}/v1/convert/file", self.base_url);
        tracing::debug!(url = %url, bytes = document.len(), mime, "Submitting document to docling-serve");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ConversionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConversionError::ApiError(status.as_u16(), error_text));
        }

        let body: DoclingResponse = response
            .json()
            .await
            .map_err(|e| ConversionError::ParseError(e.to_string()))?;

        if !body.errors.is_empty() {
            tracing::warn!(
                status = ?body.status,
                errors = body.errors.len(),
                "docling-serve reported conversion errors"
            );
        }

        match body.document.md_content {
            Some(markdown) if !markdown.trim().is_empty() => Ok(markdown),
            _ => Err(ConversionError::ParseError(format!(
                "docling-serve returned no markdown (status {})",
                body.status.as_deref().unwrap_or("unknown")
            ))),
        }
    }
}

// ============================================================================
// External command
// ============================================================================

/// Converter running an external program on a temporary copy of the upload
///
/// The program receives the file path as its last argument and must print
/// the text on stdout. The temporary file is removed when the call returns,
/// whatever the outcome.
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn convert(&self, document: &[u8]) -> Result<String, ConversionError> {
        if document.is_empty() {
            return Err(ConversionError::EmptyDocument);
        }

        let (extension, _) = sniff_document_type(document);
        let mut input = tempfile::Builder::new()
            .prefix("idrec-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        input.write_all(document)?;
        input.flush()?;

        tracing::debug!(
            program = %self.program,
            input = %input.path().display(),
            "Running converter program"
        );

        let run = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(input.path())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                ConversionError::CommandFailed(format!(
                    "{} timed out after {:?}",
                    self.program, self.timeout
                ))
            })?
            .map_err(|e| ConversionError::CommandFailed(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(ConversionError::CommandFailed(format!(
                "{} produced no text",
                self.program
            )));
        }
        Ok(text)
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Accepts documents that are already UTF-8 text
pub struct PlainTextConverter;

#[async_trait]
impl DocumentConverter for PlainTextConverter {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    async fn convert(&self, document: &[u8]) -> Result<String, ConversionError> {
        let text = std::str::from_utf8(document).map_err(|_| ConversionError::NotText)?;
        if text.trim().is_empty() {
            return Err(ConversionError::EmptyDocument);
        }
        Ok(text.to_string())
    }
}
