//! Error types for the criteria engine.

use thiserror::Error;
use xcl_ingest::IngestError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation left nothing to apply.
    #[error("no usable inclusion/exclusion criteria")]
    NoCriteria,

    #[error(transparent)]
    Table(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
