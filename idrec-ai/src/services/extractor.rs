//! Text-to-fields extraction through a language model
//!
//! The model is asked for one flat JSON object over the identity schema.
//! Its reply is never trusted: it goes through [`FieldMapping::from_json`],
//! which rejects anything that is not a flat object of scalars.

use async_trait::async_trait;
use idrec_common::config::ExtractorConfig;
use idrec_common::fields::MappingError;
use idrec_common::{FieldMapping, FieldName};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Extractor errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No text to extract from")]
    EmptyText,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Extractor API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Malformed extractor response: {0}")]
    MalformedResponse(String),

    #[error("Model output is not JSON: {0}")]
    InvalidJson(String),

    #[error("Model output is not a field mapping: {0}")]
    InvalidMapping(#[from] MappingError),
}

/// Text → field mapping collaborator
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extractor name for logs
    fn name(&self) -> &'static str;

    /// Extract identity fields from document text
    async fn extract(&self, text: &str) -> Result<FieldMapping, ExtractionError>;
}

/// Prompt asking the model for the identity schema as a JSON object
pub fn build_prompt(text: &str) -> String {
    let keys = FieldName::ALL
        .iter()
        .map(|field| format!("- {}", field.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an intelligent document parser. Extract structured JSON data from text.\n\
         \n\
         Output only a JSON object with the following keys (if available):\n\
         {keys}\n\
         \n\
         The following is a cleaned markdown document. Extract its sections into the JSON \
         object described above and put null if values are not available. Do not include \
         any other text or explanation, just the JSON object.\n\
         \n\
         Markdown content:\n\
         {text}\n"
    )
}

/// Remove a surrounding markdown code fence (```json ... ```), if any
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);

    match inner.find('\n') {
        Some(newline) if inner[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            inner[newline + 1..].trim()
        }
        _ => inner.trim(),
    }
}

/// Parse the model's reply into a validated field mapping
pub fn parse_model_output(content: &str) -> Result<FieldMapping, ExtractionError> {
    let json = strip_code_fence(content);
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;
    Ok(FieldMapping::from_json(value)?)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Extractor backed by an Ollama chat endpoint
pub struct OllamaExtractor {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl FieldExtractor for OllamaExtractor {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn extract(&self, text: &str) -> Result<FieldMapping, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(text),
            }],
            stream: false,
            format: "json",
        };

        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(url = %url, model = %self.model, chars = text.len(), "Querying extraction model");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ApiError(status.as_u16(), error_text));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        let mapping = parse_model_output(&reply.message.content)?;
        tracing::info!(
            model = %self.model,
            fields = mapping.len(),
            "Extracted identity fields"
        );
        Ok(mapping)
    }
}
