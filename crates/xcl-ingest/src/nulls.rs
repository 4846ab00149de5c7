//! Null vocabulary loading.

use std::path::Path;

use tracing::debug;
use xcl_model::NullVocabulary;

use crate::error::{Result, read_error};

/// Built-in vocabulary, one token per line.
pub const DEFAULT_NULLS: &str = include_str!("../resources/nulls.txt");

pub fn default_null_vocabulary() -> NullVocabulary {
    NullVocabulary::new(DEFAULT_NULLS.lines())
}

/// Load the vocabulary from `path`, or the built-in one when no path is given.
pub fn load_null_vocabulary(path: Option<&Path>) -> Result<NullVocabulary> {
    let vocabulary = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
            NullVocabulary::new(text.lines())
        }
        None => default_null_vocabulary(),
    };
    debug!(tokens = vocabulary.len(), "null vocabulary loaded");
    Ok(vocabulary)
}
