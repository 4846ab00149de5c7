//! Sample metadata ingestion.
//!
//! Loads the delimited metadata table into a Polars-backed [`MetadataTable`],
//! and reads the criteria, plot-group and null-vocabulary configuration that
//! drive a run.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use xcl_ingest::{load_null_vocabulary, read_criteria_config, read_metadata_table};
//!
//! let table = read_metadata_table(Path::new("metadata.tsv"))?;
//! let config = read_criteria_config(Some(Path::new("criteria.yml")))?;
//! let nulls = load_null_vocabulary(None)?;
//! ```

mod config;
mod error;
mod nulls;
pub mod polars_utils;
mod reader;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Table ===
pub use reader::{DELIMITERS, NATIVE_NULLS, detect_delimiter, read_metadata_table};
pub use table::{MetadataTable, SAMPLE_ID};

// === Configuration ===
pub use config::{
    CriteriaConfig, CriteriaEntry, FactorValues, PlotGroups, parse_criteria_config,
    read_criteria_config, read_plot_groups,
};
pub use nulls::{DEFAULT_NULLS, default_null_vocabulary, load_null_vocabulary};
