//! Sample metadata table backed by a Polars DataFrame.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::polars_utils::{any_to_f64, any_to_text};

/// Name of the row-identifier column, always first.
pub const SAMPLE_ID: &str = "sample_name";

/// One row per sample, one column per variable.
///
/// The first column is [`SAMPLE_ID`] and holds unique identifiers. Every
/// operation returns a new table; the wrapped frame is never shared mutably.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    df: DataFrame,
}

impl MetadataTable {
    /// Wrap a frame whose first column is [`SAMPLE_ID`] with unique values.
    pub fn new(df: DataFrame) -> Result<Self> {
        let first = df
            .get_column_names()
            .first()
            .map(|name| name.as_str() == SAMPLE_ID)
            .unwrap_or(false);
        if !first {
            return Err(IngestError::ColumnNotFound {
                column: SAMPLE_ID.to_string(),
            });
        }
        let table = Self { df };
        let mut seen = HashSet::with_capacity(table.height());
        for sample in table.sample_ids()? {
            if !seen.insert(sample.clone()) {
                return Err(IngestError::DuplicateSample { sample });
            }
        }
        Ok(table)
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Variable names, in column order, without the identifier column.
    pub fn variables(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .skip(1)
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        variable != SAMPLE_ID && self.df.column(variable).is_ok()
    }

    pub fn column(&self, variable: &str) -> Result<&Column> {
        self.df
            .column(variable)
            .map_err(|_| IngestError::ColumnNotFound {
                column: variable.to_string(),
            })
    }

    /// Native storage type of a variable.
    pub fn storage(&self, variable: &str) -> Result<DataType> {
        Ok(self.column(variable)?.dtype().clone())
    }

    pub fn sample_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .text_values(SAMPLE_ID)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    /// Text form of every cell of a variable; `None` marks a missing value.
    pub fn text_values(&self, variable: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(variable)?;
        Ok((0..column.len())
            .map(|idx| any_to_text(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect())
    }

    /// Numeric form of every cell of a variable; non-numeric cells are `None`.
    pub fn f64_values(&self, variable: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(variable)?;
        Ok((0..column.len())
            .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect())
    }

    /// Distinct non-missing values of a variable.
    pub fn distinct_text(&self, variable: &str) -> Result<BTreeSet<String>> {
        Ok(self.text_values(variable)?.into_iter().flatten().collect())
    }

    /// Rows where `keep` is true, in order.
    pub fn filter(&self, keep: &[bool]) -> Result<Self> {
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        Ok(Self {
            df: self.df.filter(&mask)?,
        })
    }

    /// Rows of `self` followed by the rows of `other` whose identifier is not
    /// already present. Both tables must share a schema.
    pub fn union(&self, other: &MetadataTable) -> Result<Self> {
        let mut df = self.df.clone();
        df.vstack_mut(&other.df)?;
        let stacked = Self { df };
        let mut seen = HashSet::with_capacity(stacked.height());
        let keep: Vec<bool> = stacked
            .sample_ids()?
            .into_iter()
            .map(|sample| seen.insert(sample))
            .collect();
        stacked.filter(&keep)
    }

    /// Rows whose identifier is not in `samples`, in order.
    pub fn excluding(&self, samples: &HashSet<String>) -> Result<Self> {
        let keep: Vec<bool> = self
            .sample_ids()?
            .iter()
            .map(|sample| !samples.contains(sample))
            .collect();
        self.filter(&keep)
    }

    /// Copy of the table with `variable` replaced by a `Float64` column.
    pub fn with_float_column(&self, variable: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.column(variable)?;
        let mut df = self.df.clone();
        df.with_column(Series::new(variable.into(), values))?;
        Ok(Self { df })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> MetadataTable {
        let df = DataFrame::new(vec![
            Column::new(SAMPLE_ID.into(), ["s1", "s2", "s3"]),
            Column::new("abx".into(), [Some("Yes"), None, Some("No")]),
            Column::new("age".into(), [Some(30.0), Some(40.5), None]),
        ])
        .unwrap();
        MetadataTable::new(df).unwrap()
    }

    #[test]
    fn rejects_duplicate_samples() {
        let df = DataFrame::new(vec![Column::new(SAMPLE_ID.into(), ["s1", "s1"])]).unwrap();
        let err = MetadataTable::new(df).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateSample { sample } if sample == "s1"));
    }

    #[test]
    fn requires_identifier_first() {
        let df = DataFrame::new(vec![Column::new("id".into(), ["s1"])]).unwrap();
        assert!(MetadataTable::new(df).is_err());
    }

    #[test]
    fn reads_cells_as_text_and_numbers() {
        let table = test_table();
        assert_eq!(table.variables(), vec!["abx", "age"]);
        assert_eq!(
            table.text_values("age").unwrap(),
            vec![Some("30".to_string()), Some("40.5".to_string()), None]
        );
        assert_eq!(table.f64_values("abx").unwrap(), vec![None, None, None]);
        assert!(!table.has_variable(SAMPLE_ID));
    }

    #[test]
    fn union_keeps_left_order_and_drops_duplicates() {
        let table = test_table();
        let left = table.filter(&[false, true, true]).unwrap();
        let right = table.filter(&[true, true, false]).unwrap();
        let merged = left.union(&right).unwrap();
        assert_eq!(merged.sample_ids().unwrap(), vec!["s2", "s3", "s1"]);
    }

    #[test]
    fn excluding_keeps_original_order() {
        let table = test_table();
        let drop: HashSet<String> = ["s2".to_string()].into_iter().collect();
        let rest = table.excluding(&drop).unwrap();
        assert_eq!(rest.sample_ids().unwrap(), vec!["s1", "s3"]);
    }
}
