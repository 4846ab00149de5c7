//! Tab-separated output of included and excluded samples.

use std::fs;
use std::path::Path;

use tracing::info;
use xcl_ingest::MetadataTable;

use crate::error::{ReportError, Result};
use crate::records::table_header;

/// Write `table` as TSV: identifier column first, missing values as empty
/// cells. Parent directories are created.
pub fn write_table(table: &MetadataTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let csv_error = |err: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let header = table_header(table);
    let samples = table.sample_ids()?;
    let mut columns = Vec::with_capacity(header.len() - 1);
    for variable in &header[1..] {
        columns.push(table.text_values(variable)?);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(&header).map_err(csv_error)?;
    for (row, sample) in samples.iter().enumerate() {
        let record = std::iter::once(sample.as_str()).chain(
            columns
                .iter()
                .map(|values| values[row].as_deref().unwrap_or_default()),
        );
        writer.write_record(record).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = samples.len(), "table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use xcl_ingest::SAMPLE_ID;

    #[test]
    fn writes_tab_separated_rows_with_empty_missing_cells() {
        let df = DataFrame::new(vec![
            Column::new(SAMPLE_ID.into(), ["s1", "s2"]),
            Column::new("abx".into(), [Some("Yes"), None]),
            Column::new("age".into(), [Some(20.0), Some(35.5)]),
        ])
        .unwrap();
        let table = MetadataTable::new(df).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("included.tsv");

        write_table(&table, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "sample_name\tabx\tage\ns1\tYes\t20\ns2\t\t35.5\n");
    }
}
