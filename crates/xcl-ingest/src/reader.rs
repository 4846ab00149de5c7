//! Delimited metadata file reading.

use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result, read_error};
use crate::polars_utils::parse_f64;
use crate::table::{MetadataTable, SAMPLE_ID};

/// Candidate separators, in detection order.
pub const DELIMITERS: [u8; 3] = [b'\t', b';', b','];

/// Cell values read as missing in any column.
pub const NATIVE_NULLS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Pick the separator of a header line.
///
/// A separator is accepted when it splits the header into more than one field
/// and the field count is its occurrence count plus one.
pub fn detect_delimiter(header: &str) -> Option<u8> {
    let header = header.trim();
    DELIMITERS.into_iter().find(|&delimiter| {
        let separator = char::from(delimiter);
        let fields = header.split(separator).count();
        fields > 1 && fields == header.matches(separator).count() + 1
    })
}

fn normalize_cell(raw: &str) -> Option<String> {
    if NATIVE_NULLS.contains(&raw.trim()) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Read a metadata file into a [`MetadataTable`].
///
/// The first column becomes [`SAMPLE_ID`]; other column names are
/// lower-cased and columns holding only missing values are dropped.
pub fn read_metadata_table(path: &Path) -> Result<MetadataTable> {
    let content = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let header = content
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| IngestError::EmptyFile {
            path: path.to_path_buf(),
        })?;
    let delimiter = detect_delimiter(header).ok_or_else(|| IngestError::NoDelimiter {
        path: path.to_path_buf(),
    })?;

    let csv_error = |err: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut samples = Vec::new();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len().saturating_sub(1)];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        samples.push(record.get(0).unwrap_or_default().trim().to_string());
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx + 1).and_then(normalize_cell));
        }
    }

    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(headers.len());
    seen.insert(SAMPLE_ID.to_string());
    columns.push(Column::new(SAMPLE_ID.into(), samples));
    for (idx, (name, values)) in headers.iter().skip(1).zip(cells).enumerate() {
        let name = if name.is_empty() {
            format!("unnamed: {}", idx + 1)
        } else {
            name.to_lowercase()
        };
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: name,
                path: path.to_path_buf(),
            });
        }
        if values.iter().all(Option::is_none) {
            debug!(column = %name, "dropping column with only missing values");
            continue;
        }
        columns.push(typed_column(&name, values));
    }

    let table = MetadataTable::new(DataFrame::new(columns)?)?;
    debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        samples = table.height(),
        variables = table.variables().len(),
        "metadata loaded"
    );
    Ok(table)
}

/// Narrowest storage for a column: `Int64` without missing values, then
/// `Float64`, then `String`.
fn typed_column(name: &str, values: Vec<Option<String>>) -> Column {
    let integers: Option<Vec<i64>> = values
        .iter()
        .map(|value| value.as_deref()?.trim().parse::<i64>().ok())
        .collect();
    if let Some(integers) = integers {
        return Column::new(name.into(), integers);
    }
    let floats: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|value| match value {
            None => Some(None),
            Some(text) => parse_f64(text).map(Some),
        })
        .collect();
    if let Some(floats) = floats {
        return Column::new(name.into(), floats);
    }
    Column::new(name.into(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_delimiters() {
        assert_eq!(detect_delimiter("sample\tage\tabx"), Some(b'\t'));
        assert_eq!(detect_delimiter("sample;age"), Some(b';'));
        assert_eq!(detect_delimiter("sample,age"), Some(b','));
        assert_eq!(detect_delimiter("sample age"), None);
    }

    #[test]
    fn tab_wins_over_comma() {
        assert_eq!(detect_delimiter("sample\tage,years"), Some(b'\t'));
    }

    #[test]
    fn infers_column_storage() {
        let ints = typed_column("n", vec![Some("1".into()), Some("2".into())]);
        assert_eq!(ints.dtype(), &DataType::Int64);
        let with_null = typed_column("n", vec![Some("1".into()), None]);
        assert_eq!(with_null.dtype(), &DataType::Float64);
        let text = typed_column("n", vec![Some("1".into()), Some("x".into())]);
        assert_eq!(text.dtype(), &DataType::String);
    }

    #[test]
    fn native_nulls_become_missing() {
        assert_eq!(normalize_cell("NA"), None);
        assert_eq!(normalize_cell(" "), None);
        assert_eq!(normalize_cell("Yes"), Some("Yes".to_string()));
    }
}
