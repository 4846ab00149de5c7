//! Property tests for filtering and dtype inference.

use polars::prelude::{Column, DataFrame};
use proptest::prelude::*;

use xcl_core::{do_filtering, infer_dtypes};
use xcl_ingest::{MetadataTable, SAMPLE_ID};
use xcl_model::{Criterion, Diagnostics, NullVocabulary, RangeBounds, Rule};

fn table_with(column: Column) -> MetadataTable {
    let ids: Vec<String> = (0..column.len()).map(|idx| format!("s{idx}")).collect();
    let df = DataFrame::new(vec![Column::new(SAMPLE_ID.into(), ids), column]).unwrap();
    MetadataTable::new(df).unwrap()
}

fn text_cell() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "yes", "Yes", "YES", "no", "No", "maybe", "nan",
    ]))
    .prop_map(|value| value.map(String::from))
}

fn mixed_cell() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "1", "2.5", "-3", "missing", "Missing value", "abc", "True", "False",
    ]))
    .prop_map(|value| value.map(String::from))
}

fn factors() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["yes", "Yes", "no", "No", "maybe", "nan"]),
        1..4,
    )
    .prop_map(|values| values.into_iter().map(String::from).collect())
}

fn apply(table: &MetadataTable, criterion: &Criterion) -> MetadataTable {
    let numeric = vec!["v".to_string()];
    let mut diagnostics = Diagnostics::new();
    do_filtering(table, criterion, &numeric, &mut diagnostics)
        .unwrap()
        .unwrap_or_else(|| table.clone())
}

proptest! {
    #[test]
    fn include_keeps_only_listed_values(
        cells in prop::collection::vec(text_cell(), 0..30),
        factors in factors(),
    ) {
        let table = table_with(Column::new("v".into(), cells));
        let kept = apply(&table, &Criterion::new("v", Rule::Include(factors.clone())));
        for value in kept.text_values("v").unwrap() {
            let value = value.expect("missing values never match");
            prop_assert!(factors.contains(&value));
        }
    }

    #[test]
    fn exclude_leaves_no_listed_value(
        cells in prop::collection::vec(text_cell(), 0..30),
        factors in factors(),
    ) {
        let table = table_with(Column::new("v".into(), cells));
        let kept = apply(&table, &Criterion::new("v", Rule::Exclude(factors.clone())));
        let lowered: Vec<String> = factors.iter().map(|f| f.to_lowercase()).collect();
        for value in kept.text_values("v").unwrap() {
            let text = value.unwrap_or_else(|| "nan".to_string()).to_lowercase();
            prop_assert!(!lowered.contains(&text));
        }
    }

    #[test]
    fn range_never_keeps_missing_values(
        cells in prop::collection::vec(prop::option::of(-100.0f64..100.0), 0..30),
        min in prop::option::of(-50.0f64..0.0),
        max in prop::option::of(0.0f64..50.0),
    ) {
        prop_assume!(min.is_some() || max.is_some());
        let table = table_with(Column::new("v".into(), cells));
        let bounds = RangeBounds::new(min, max);
        let kept = apply(&table, &Criterion::new("v", Rule::Range(bounds)));
        for value in kept.f64_values("v").unwrap() {
            let value = value.expect("missing values never pass a bound");
            prop_assert!(min.is_none_or(|min| value > min));
            prop_assert!(max.is_none_or(|max| value < max));
        }
    }

    #[test]
    fn union_is_idempotent(
        left in prop::collection::vec(any::<bool>(), 12),
        right in prop::collection::vec(any::<bool>(), 12),
    ) {
        let cells: Vec<Option<String>> = (0..12).map(|idx| Some(format!("v{idx}"))).collect();
        let table = table_with(Column::new("v".into(), cells));
        let left = table.filter(&left).unwrap();
        let right = table.filter(&right).unwrap();

        let once = left.union(&right).unwrap();
        let twice = once.union(&right).unwrap();
        prop_assert_eq!(once.sample_ids().unwrap(), twice.sample_ids().unwrap());
    }

    #[test]
    fn inference_is_idempotent(cells in prop::collection::vec(mixed_cell(), 1..20)) {
        let nulls = NullVocabulary::new(["missing"]);
        let table = table_with(Column::new("v".into(), cells));
        let (resolved, first) = infer_dtypes(&table, &nulls).unwrap();
        let (_, second) = infer_dtypes(&resolved, &nulls).unwrap();
        prop_assert_eq!(first, second);
    }
}
