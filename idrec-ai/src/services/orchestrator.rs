//! Two-document extraction and reconciliation
//!
//! Each document runs through convert → extract on its own; the two
//! pipelines run concurrently and both must succeed before scoring and
//! reconciliation. A failure on either document fails the whole request.

use idrec_common::{reconcile, similarity_score, ConsolidatedRecord, FieldMapping};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

use super::converter::DocumentConverter;
use super::extractor::FieldExtractor;
use crate::error::PipelineError;

/// Combined result for two documents
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    #[serde(rename = "document_1_details")]
    pub document_1: FieldMapping,
    #[serde(rename = "document_2_details")]
    pub document_2: FieldMapping,
    #[serde(rename = "consolidated_details")]
    pub consolidated: ConsolidatedRecord,
    #[serde(rename = "similarity_percentage")]
    pub similarity: f64,
}

impl ProcessOutcome {
    /// Score and reconcile two mappings; document 1 anchors the score
    pub fn compare(document_1: FieldMapping, document_2: FieldMapping) -> Self {
        let similarity = similarity_score(&document_1, &document_2);
        let consolidated = reconcile(&document_1, &document_2);

        tracing::info!(
            similarity,
            fields = consolidated.len(),
            disagreements = consolidated.disagreements().count(),
            "Documents reconciled"
        );

        Self {
            document_1,
            document_2,
            consolidated,
            similarity,
        }
    }
}

/// Drives converter and extractor for a pair of documents
pub struct ExtractionOrchestrator {
    converter: Arc<dyn DocumentConverter>,
    extractor: Arc<dyn FieldExtractor>,
}

impl ExtractionOrchestrator {
    pub fn new(converter: Arc<dyn DocumentConverter>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            converter,
            extractor,
        }
    }

    pub fn converter_name(&self) -> &'static str {
        self.converter.name()
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Extract both documents, then score and reconcile them
    pub async fn process(
        &self,
        document_1: &[u8],
        document_2: &[u8],
    ) -> Result<ProcessOutcome, PipelineError> {
        let (fields_1, fields_2) = tokio::try_join!(
            self.extract_document(1, document_1),
            self.extract_document(2, document_2),
        )?;

        Ok(ProcessOutcome::compare(fields_1, fields_2))
    }

    async fn extract_document(
        &self,
        document: usize,
        bytes: &[u8],
    ) -> Result<FieldMapping, PipelineError> {
        let span = tracing::info_span!("document", document, bytes = bytes.len());

        async {
            let text = self
                .converter
                .convert(bytes)
                .await
                .map_err(|source| PipelineError::Conversion { document, source })?;
            tracing::debug!(
                converter = self.converter.name(),
                chars = text.len(),
                "Document converted"
            );

            let fields = self
                .extractor
                .extract(&text)
                .await
                .map_err(|source| PipelineError::Extraction { document, source })?;
            tracing::debug!(
                extractor = self.extractor.name(),
                fields = fields.len(),
                "Fields extracted"
            );

            Ok(fields)
        }
        .instrument(span)
        .await
    }
}
