//! Field reconciliation between two extracted documents
//!
//! - [`dates`]: lenient calendar-date parsing for date fields
//! - [`similarity`]: percentage of agreeing fields, anchored on document 1
//! - [`consolidate`]: per-field merge that keeps disagreements side by side

pub mod consolidate;
pub mod dates;
pub mod similarity;

pub use consolidate::{reconcile, Consolidated, ConsolidatedRecord};
pub use dates::parse_date;
pub use similarity::similarity_score;
