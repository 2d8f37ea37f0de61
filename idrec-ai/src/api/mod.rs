//! HTTP API handlers for idrec-ai

pub mod compare;
pub mod health;
pub mod records;
pub mod upload;

pub use compare::compare_routes;
pub use health::health_routes;
pub use records::record_routes;
pub use upload::upload_routes;
