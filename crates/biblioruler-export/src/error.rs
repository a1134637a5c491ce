//! Error types for the exporters

use biblioruler_domain::ModelError;
use biblioruler_sources::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Annotations could not be written into a copy of a file
#[derive(Error, Debug)]
#[error("Cannot embed annotations of {} into {}: {reason}", source_path.display(), target.display())]
pub struct EmbeddingError {
    pub source_path: PathBuf,
    pub target: PathBuf,
    pub reason: String,
}

impl EmbeddingError {
    pub fn new(source_path: impl Into<PathBuf>, target: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            source_path: source_path.into(),
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while writing an export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Recoverable: callers fall back to linking the original file
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown exporter: {0}")]
    UnknownExporter(String),
}
