//! Error types for the source adapters

use biblioruler_domain::{Identity, ModelError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while connecting to or reading a source database
#[derive(Error, Debug)]
pub enum SourceError {
    /// The database could not be opened or is not of the expected kind
    #[error("Cannot open {backend} database {}: {reason}", path.display())]
    Connection {
        backend: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// A closed-vocabulary value of the source has no canonical counterpart
    #[error("Unmapped {field} [{value}] in {backend} database")]
    UnmappedValue {
        backend: &'static str,
        field: &'static str,
        value: String,
    },

    /// Query failure after a successful connection
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub(crate) fn connection(backend: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SourceError::Connection {
            backend,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Recast as a model error so it can surface through a lazy field
    pub(crate) fn into_model(self, owner: &Identity, capability: &'static str) -> ModelError {
        match self {
            SourceError::Model(err) => err,
            other => ModelError::load(owner, capability, other.to_string()),
        }
    }
}

impl From<toml::de::Error> for SourceError {
    fn from(err: toml::de::Error) -> Self {
        SourceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SourceError {
    fn from(err: toml::ser::Error) -> Self {
        SourceError::Config(err.to_string())
    }
}
