//! Variable dtype inference.
//!
//! Native `Int64`/`Float64` storage decides directly. Text columns are
//! classified from their distinct values; a column mixing numbers (or missing
//! values) with text is re-scanned after blanking null-vocabulary matches and
//! becomes `float` when only numbers remain.

use std::collections::BTreeSet;

use tracing::debug;
use xcl_ingest::MetadataTable;
use xcl_ingest::polars_utils::parse_f64;
use xcl_model::{CriteriaSet, Dtype, NullVocabulary};

use crate::error::Result;

/// Dtype per variable, in table column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableDtypes {
    entries: Vec<(String, Dtype)>,
}

impl VariableDtypes {
    pub fn get(&self, variable: &str) -> Option<Dtype> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, dtype)| *dtype)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Dtype)> {
        self.entries.iter().map(|(name, dtype)| (name.as_str(), *dtype))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Variables with an `integer` or `float` dtype.
    pub fn numeric(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, dtype)| dtype.is_numeric())
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueClass {
    Float,
    Categorical,
    /// Numbers or missing values mixed with text.
    Ambiguous,
}

fn classify_values(values: &[Option<String>]) -> ValueClass {
    let distinct: BTreeSet<Option<&str>> = values.iter().map(Option::as_deref).collect();
    let mut has_missing = false;
    let mut has_float = false;
    let mut has_non_float = false;
    let mut has_boolean = false;
    for value in distinct {
        match value {
            None => has_missing = true,
            Some("True" | "False") => has_boolean = true,
            Some(text) if parse_f64(text).is_some() => has_float = true,
            Some(_) => has_non_float = true,
        }
    }
    if has_non_float {
        if has_float || has_missing {
            ValueClass::Ambiguous
        } else {
            ValueClass::Categorical
        }
    } else if has_boolean {
        ValueClass::Categorical
    } else {
        ValueClass::Float
    }
}

/// Parse every value once null-vocabulary matches are blanked; `None` when
/// some text remains.
fn numeric_after_nulls(values: &[Option<String>], nulls: &NullVocabulary) -> Option<Vec<Option<f64>>> {
    values
        .iter()
        .map(|value| match value.as_deref() {
            None => Some(None),
            Some(text) if nulls.matches_within(text) => Some(None),
            Some(text) => parse_f64(text).map(Some),
        })
        .collect()
}

/// Infer the dtype of every variable.
///
/// Returns a copy of the table in which variables resolved to `float` from
/// text storage are rewritten as `Float64` columns, together with the dtypes.
/// The input table is left untouched.
pub fn infer_dtypes(
    table: &MetadataTable,
    nulls: &NullVocabulary,
) -> Result<(MetadataTable, VariableDtypes)> {
    let mut resolved = table.clone();
    let mut dtypes = VariableDtypes::default();
    for variable in table.variables() {
        let storage = table.storage(&variable)?;
        let dtype = if storage.is_integer() {
            Dtype::Integer
        } else if storage.is_float() {
            Dtype::Float
        } else {
            let values = table.text_values(&variable)?;
            let converted = match classify_values(&values) {
                ValueClass::Categorical => None,
                ValueClass::Float => values
                    .iter()
                    .map(|value| value.as_deref().map_or(Some(None), |t| parse_f64(t).map(Some)))
                    .collect(),
                ValueClass::Ambiguous => {
                    let converted = numeric_after_nulls(&values, nulls);
                    debug!(
                        variable = %variable,
                        resolved = if converted.is_some() { "float" } else { "categorical" },
                        "ambiguous variable re-scanned"
                    );
                    converted
                }
            };
            match converted {
                Some(numbers) => {
                    resolved = resolved.with_float_column(&variable, numbers)?;
                    Dtype::Float
                }
                None => Dtype::Categorical,
            }
        };
        dtypes.entries.push((variable, dtype));
    }
    Ok((resolved, dtypes))
}

/// Numeric variables, and the categorical variables some criterion uses.
pub fn split_variables(dtypes: &VariableDtypes, criteria: &CriteriaSet) -> (Vec<String>, Vec<String>) {
    let used = criteria.variables();
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    for (variable, dtype) in dtypes.iter() {
        if dtype.is_numeric() {
            numeric.push(variable.to_string());
        } else if used.contains(variable) {
            categorical.push(variable.to_string());
        }
    }
    (numeric, categorical)
}
