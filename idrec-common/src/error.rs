//! Error type shared by the idrec crates

use thiserror::Error;

use crate::fields::FieldName;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Record store failure
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data folder or config file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or malformed TOML configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submitted value cannot be stored in its column
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: FieldName, reason: String },

    /// A stored row that no longer decodes (bad guid or timestamp)
    #[error("Corrupt stored record: {0}")]
    CorruptRecord(String),
}

impl Error {
    pub fn invalid_field(field: FieldName, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
