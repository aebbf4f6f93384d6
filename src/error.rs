use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures. Per-document anomalies are never errors; they are
/// reported as [`crate::Discrepancy`] values instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid path: {} is not an existing directory", .0.display())]
    NotFound(PathBuf),

    #[error("document store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    #[error("failed to (de)serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid collection name: '{0}'")]
    InvalidCollection(String),

    #[error("invalid document field: '{0}'")]
    InvalidField(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
