//! Service modules for document reconciliation
//!
//! - `converter`: document bytes → text collaborators
//! - `extractor`: text → field mapping collaborators
//! - `orchestrator`: runs both documents and reconciles the results

pub mod converter;
pub mod extractor;
pub mod orchestrator;

pub use converter::{
    converter_from_config, CommandConverter, ConversionError, DocumentConverter,
    DoclingServeConverter, PlainTextConverter,
};
pub use extractor::{ExtractionError, FieldExtractor, OllamaExtractor};
pub use orchestrator::{ExtractionOrchestrator, ProcessOutcome};
