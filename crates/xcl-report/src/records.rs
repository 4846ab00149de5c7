//! Chart-ready records.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use xcl_ingest::{MetadataTable, PlotGroups, SAMPLE_ID};
use xcl_model::{Flowchart, Phase};

use crate::error::Result;

/// Marker of the first row of a `(sample, variable, value)` triple.
pub const UNIQUE_MARK: &str = "ID";

/// One flowchart step, flattened for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowchartRecord {
    pub order: usize,
    pub phase: Phase,
    pub step: String,
    pub samples: usize,
    pub variable: Option<String>,
    pub values: Option<String>,
    pub indicator: Option<String>,
}

/// Flowchart steps in application order.
pub fn flowchart_records(flowchart: &Flowchart) -> Vec<FlowchartRecord> {
    flowchart
        .iter()
        .enumerate()
        .map(|(order, (phase, step))| FlowchartRecord {
            order,
            phase,
            step: step.label.clone(),
            samples: step.samples,
            variable: step.variable.clone(),
            values: step.values.clone(),
            indicator: step.mode.map(|mode| mode.token().to_string()),
        })
        .collect()
}

/// A sample's values for an ordered pair of distinct numeric variables,
/// joined with one of its categorical values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub sample_name: String,
    pub num_var_x: String,
    pub num_var_y: String,
    pub num_val_x: f64,
    pub num_val_y: f64,
    pub cat_var: String,
    pub cat_val: String,
    pub is_unique_id: Option<&'static str>,
}

/// Everything the visualization needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub flowchart: Vec<FlowchartRecord>,
    pub samples: Vec<SampleRecord>,
    /// Distinct `num_var_x` values, in first-seen order.
    pub numeric_x: Vec<String>,
    /// Distinct `num_var_y` values, in first-seen order.
    pub numeric_y: Vec<String>,
    /// Factors grouped by variable, each group sorted.
    pub sorted_factors: Vec<String>,
}

/// Build chart records from the included table.
///
/// Numeric values are paired per sample across distinct variables, then
/// joined with every categorical value of the same sample; samples missing
/// either side are left out. A `categories` plot group, when configured,
/// restricts the categorical variables.
pub fn build_chart_data(
    flowchart: &Flowchart,
    included: &MetadataTable,
    numeric: &[String],
    categorical: &[String],
    groups: &PlotGroups,
) -> Result<ChartData> {
    let categorical: Vec<&String> = match groups.categories() {
        Some(allowed) => categorical.iter().filter(|v| allowed.contains(*v)).collect(),
        None => categorical.iter().collect(),
    };

    let samples = included.sample_ids()?;
    let mut numeric_columns = Vec::with_capacity(numeric.len());
    for variable in numeric {
        numeric_columns.push((variable, included.f64_values(variable)?));
    }
    let mut categorical_columns = Vec::with_capacity(categorical.len());
    for variable in categorical {
        categorical_columns.push((variable, included.text_values(variable)?));
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (row, sample) in samples.iter().enumerate() {
        let numbers: Vec<(&String, f64)> = numeric_columns
            .iter()
            .filter_map(|(variable, values)| values[row].map(|value| (*variable, value)))
            .collect();
        let categories: Vec<(&String, &String)> = categorical_columns
            .iter()
            .filter_map(|(variable, values)| values[row].as_ref().map(|value| (*variable, value)))
            .collect();
        for (var_x, val_x) in &numbers {
            for (var_y, val_y) in &numbers {
                if var_x == var_y {
                    continue;
                }
                for (cat_var, cat_val) in &categories {
                    let first = seen.insert((sample.as_str(), cat_var.as_str(), cat_val.as_str()));
                    records.push(SampleRecord {
                        sample_name: sample.clone(),
                        num_var_x: (*var_x).clone(),
                        num_var_y: (*var_y).clone(),
                        num_val_x: *val_x,
                        num_val_y: *val_y,
                        cat_var: (*cat_var).clone(),
                        cat_val: (*cat_val).clone(),
                        is_unique_id: first.then_some(UNIQUE_MARK),
                    });
                }
            }
        }
    }

    Ok(ChartData {
        flowchart: flowchart_records(flowchart),
        numeric_x: first_seen(records.iter().map(|r| r.num_var_x.as_str())),
        numeric_y: first_seen(records.iter().map(|r| r.num_var_y.as_str())),
        sorted_factors: sorted_factors(&records),
        samples: records,
    })
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

/// Distinct factors, grouped by variable name and sorted within each group.
pub fn sorted_factors(records: &[SampleRecord]) -> Vec<String> {
    let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.cat_var.as_str())
            .or_default()
            .insert(record.cat_val.as_str());
    }
    grouped
        .into_values()
        .flatten()
        .map(str::to_string)
        .collect()
}

/// Header for table outputs: identifier then variables.
pub(crate) fn table_header(table: &MetadataTable) -> Vec<String> {
    std::iter::once(SAMPLE_ID.to_string())
        .chain(table.variables())
        .collect()
}
