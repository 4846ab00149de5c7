use std::fs;
use std::path::PathBuf;

use polars::prelude::DataType;
use tempfile::TempDir;

use xcl_ingest::{
    IngestError, SAMPLE_ID, load_null_vocabulary, read_criteria_config, read_metadata_table,
    read_plot_groups,
};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_tab_separated_metadata() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "md.tsv",
        "#SampleID\tAge\tAntibiotic_History\tEmpty\ns1\t30\tYes\t\ns2\t45\tNo\tNA\ns3\t\tNo\t\n",
    );

    let table = read_metadata_table(&path).expect("read metadata");

    assert_eq!(table.height(), 3);
    assert_eq!(table.variables(), vec!["age", "antibiotic_history"]);
    assert_eq!(table.sample_ids().unwrap(), vec!["s1", "s2", "s3"]);
    assert_eq!(table.storage("age").unwrap(), DataType::Float64);
    assert_eq!(table.storage("antibiotic_history").unwrap(), DataType::String);
    assert_eq!(table.storage(SAMPLE_ID).unwrap(), DataType::String);
}

#[test]
fn reads_comma_and_semicolon_files() {
    let dir = TempDir::new().unwrap();
    let comma = write_file(&dir, "md.csv", "id,count\na,1\nb,2\n");
    let semicolon = write_file(&dir, "md.txt", "id;group\na;x, y\nb;z\n");

    let table = read_metadata_table(&comma).unwrap();
    assert_eq!(table.storage("count").unwrap(), DataType::Int64);

    let table = read_metadata_table(&semicolon).unwrap();
    assert_eq!(
        table.text_values("group").unwrap(),
        vec![Some("x, y".to_string()), Some("z".to_string())]
    );
}

#[test]
fn strips_byte_order_mark() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bom.tsv", "\u{feff}Sample\tSex\ns1\tF\n");
    let table = read_metadata_table(&path).unwrap();
    assert_eq!(table.variables(), vec!["sex"]);
}

#[test]
fn missing_delimiter_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.txt", "sample age\ns1 30\n");
    let err = read_metadata_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::NoDelimiter { .. }));
}

#[test]
fn duplicate_samples_are_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "dup.tsv", "sample\tage\ns1\t1\ns1\t2\n");
    let err = read_metadata_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::DuplicateSample { sample } if sample == "s1"));
}

#[test]
fn missing_optional_files_are_empty() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.yml");
    assert!(read_criteria_config(Some(&absent)).unwrap().is_empty());
    assert!(read_criteria_config(None).unwrap().is_empty());
    assert!(read_plot_groups(Some(&absent)).unwrap().is_empty());
}

#[test]
fn reads_criteria_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "criteria.yml",
        "init:\n  antibiotic_history,0:\n    - 'Yes'\nno_nan:\n  - age\n",
    );
    let config = read_criteria_config(Some(&path)).unwrap();
    assert_eq!(config.entries.len(), 1);
    assert_eq!(config.entries[0].key, "antibiotic_history,0");
    assert_eq!(config.no_nan, vec!["age"]);
}

#[test]
fn custom_null_vocabulary_replaces_default() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "nulls.txt", "Missing\n\nnot given\n");
    let nulls = load_null_vocabulary(Some(&path)).unwrap();
    assert_eq!(nulls.tokens(), ["missing", "not given"]);
}
