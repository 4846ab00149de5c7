//! Error types for report generation.

use std::path::PathBuf;

use thiserror::Error;
use xcl_ingest::IngestError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write table {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("failed to serialize chart: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
