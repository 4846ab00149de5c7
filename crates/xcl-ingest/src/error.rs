//! Error types for metadata ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading metadata and configuration files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Table Errors ===
    /// Metadata file has no header line.
    #[error("metadata file is empty: {path}")]
    EmptyFile { path: PathBuf },

    /// None of the supported separators splits the header line.
    #[error("no separator found among: \"<tab>\", \",\", \";\" in {path}")]
    NoDelimiter { path: PathBuf },

    /// Malformed delimited record.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Two columns share a name once lower-cased.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { column: String, path: PathBuf },

    /// Sample identifiers must be unique.
    #[error("duplicate sample '{sample}' in metadata")]
    DuplicateSample { sample: String },

    /// Column not found in the table.
    #[error("column '{column}' not found in metadata")]
    ColumnNotFound { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Configuration Errors ===
    /// YAML syntax error.
    #[error("failed to parse YAML {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML parsed but does not have the expected shape.
    #[error("unexpected configuration format in {path}: {reason}")]
    ConfigFormat { path: PathBuf, reason: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

pub(crate) fn read_error(path: &std::path::Path, source: std::io::Error) -> IngestError {
    if source.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }
}
