//! # IDREC Common Library
//!
//! Shared code for the identity document reconciliation service:
//! - Field schema for extracted identity documents
//! - Date normalization, similarity scoring and field reconciliation
//! - Typed identity record built from a confirmed submission
//! - Configuration loading

pub mod config;
pub mod error;
pub mod fields;
pub mod reconcile;
pub mod record;

pub use error::{Error, Result};
pub use fields::{FieldMapping, FieldName, FieldValue};
pub use reconcile::{parse_date, reconcile, similarity_score, Consolidated, ConsolidatedRecord};
pub use record::IdentityRecord;
