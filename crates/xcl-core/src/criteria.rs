//! Criteria validation and normalization.
//!
//! Raw entries are checked against the table one at a time. A failing check
//! records a diagnostic and drops the entry; the rest of the run continues.

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::debug;
use xcl_ingest::{CriteriaConfig, FactorValues, MetadataTable};
use xcl_model::{
    CriteriaSet, Criterion, CriterionMode, Diagnostic, Diagnostics, NULLS_SENTINEL,
    NullVocabulary, Phase, RangeBounds, Rule,
};

use crate::error::Result;

/// Ad hoc criterion given on the command line: variable, mode token and
/// `/`-joined factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineCriterion {
    pub variable: String,
    pub mode: String,
    pub values: String,
}

impl CommandLineCriterion {
    pub fn new(
        variable: impl Into<String>,
        mode: impl Into<String>,
        values: impl Into<String>,
    ) -> Self {
        Self {
            variable: variable.into(),
            mode: mode.into(),
            values: values.into(),
        }
    }

    pub fn factors(&self) -> Vec<String> {
        self.values.split('/').map(str::to_string).collect()
    }
}

/// Shared state for validating a batch of entries.
struct Validator<'a> {
    table: &'a MetadataTable,
    nulls: &'a NullVocabulary,
    diagnostics: &'a mut Diagnostics,
}

impl Validator<'_> {
    fn skip(&mut self, phase: Phase, variable: Option<&str>, message: String) {
        let mut diagnostic = Diagnostic::skipped(message).with_phase(phase);
        if let Some(variable) = variable {
            diagnostic = diagnostic.with_variable(variable);
        }
        self.diagnostics.push(diagnostic);
    }

    /// `"variable,mode"` key.
    fn entry(&mut self, phase: Phase, key: &str, values: &FactorValues) -> Result<Option<Criterion>> {
        let tokens: Vec<&str> = key.split(',').collect();
        let [variable, mode] = tokens.as_slice() else {
            self.skip(
                phase,
                None,
                "Must have a metadata variable and a numeric separated by a comma (\",\")"
                    .to_string(),
            );
            return Ok(None);
        };
        self.criterion(phase, variable, mode, values)
    }

    fn criterion(
        &mut self,
        phase: Phase,
        variable: &str,
        mode: &str,
        values: &FactorValues,
    ) -> Result<Option<Criterion>> {
        let variable = variable.trim().to_lowercase();
        if !self.table.has_variable(&variable) {
            self.skip(
                phase,
                Some(&variable),
                format!("Variable {variable} not in metadata (skipped)"),
            );
            return Ok(None);
        }
        let Ok(mode) = CriterionMode::from_str(mode) else {
            let token = mode.trim();
            self.skip(
                phase,
                Some(&variable),
                format!("Numeric indicator not \"0\", \"1\" or \"2\" ({token}) ({variable} skipped)"),
            );
            return Ok(None);
        };
        let FactorValues::List(values) = values else {
            self.skip(
                phase,
                Some(&variable),
                format!("Values to subset for must be in a list format ({variable} skipped)"),
            );
            return Ok(None);
        };

        let rule = match mode {
            CriterionMode::Range => match self.range(phase, &variable, values) {
                Some(bounds) => Rule::Range(bounds),
                None => return Ok(None),
            },
            CriterionMode::Exclude | CriterionMode::Include => {
                let Some(factors) = self.factors(phase, &variable, values)? else {
                    return Ok(None);
                };
                if mode == CriterionMode::Exclude {
                    Rule::Exclude(factors)
                } else {
                    Rule::Include(factors)
                }
            }
        };
        Ok(Some(Criterion::new(variable, rule)))
    }

    fn range(&mut self, phase: Phase, variable: &str, values: &[String]) -> Option<RangeBounds> {
        let [min, max] = values else {
            self.skip(
                phase,
                Some(variable),
                "For min-max subsetting, two-items list needed: no min (or no max) should be 'None'"
                    .to_string(),
            );
            return None;
        };
        let bounds = match RangeBounds::parse(min, max) {
            Ok(bounds) => bounds,
            Err(err) => {
                self.skip(
                    phase,
                    Some(variable),
                    format!("Range bounds for {variable} must be numbers or 'None': {err} ({variable} skipped)"),
                );
                return None;
            }
        };
        if bounds.is_unbounded() {
            self.skip(
                phase,
                Some(variable),
                format!("[Warning] Both numerical bounds for {variable} are \"None\" (skipping)"),
            );
            return None;
        }
        Some(bounds)
    }

    /// Requested factors found in the table, sorted, followed by the null
    /// vocabulary when the `NULLS` sentinel was requested.
    fn factors(&mut self, phase: Phase, variable: &str, values: &[String]) -> Result<Option<Vec<String>>> {
        let requested: BTreeSet<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|value| *value != NULLS_SENTINEL)
            .collect();
        let wants_nulls = values.iter().any(|value| value == NULLS_SENTINEL);
        let observed = self.table.distinct_text(variable)?;
        let (common, missing): (Vec<&str>, Vec<&str>) = requested
            .iter()
            .copied()
            .partition(|value| observed.contains(*value));

        if common.is_empty() {
            self.skip(
                phase,
                Some(variable),
                format!("Subset values for variable {variable} not in table (skipped)"),
            );
            return Ok(None);
        }
        if !missing.is_empty() {
            self.diagnostics.push(
                Diagnostic::warning(format!(
                    "[Warning] Subset values for variable {variable} for not in table\n - {}",
                    missing.join("\n - ")
                ))
                .with_phase(phase)
                .with_variable(variable),
            );
        }

        let mut factors: Vec<String> = common.into_iter().map(str::to_string).collect();
        if wants_nulls {
            factors.extend(self.nulls.tokens().iter().cloned());
        }
        Ok(Some(factors))
    }
}

/// Validate the configured and command-line criteria against the table.
///
/// Phase blocks are read in file order, then `no_nan` variables (each a
/// `filter` exclusion of the null vocabulary), then command-line criteria
/// (also `filter`). An empty result is returned as is; callers must treat it
/// as fatal before applying anything.
pub fn build_criteria(
    config: &CriteriaConfig,
    command_line: &[CommandLineCriterion],
    table: &MetadataTable,
    nulls: &NullVocabulary,
    diagnostics: &mut Diagnostics,
) -> Result<CriteriaSet> {
    let mut criteria = CriteriaSet::new();
    let mut validator = Validator {
        table,
        nulls,
        diagnostics,
    };

    for entry in &config.entries {
        if let Some(criterion) = validator.entry(entry.phase, &entry.key, &entry.values)? {
            debug!(phase = %entry.phase, key = %entry.key, "criterion accepted");
            criteria.insert(entry.phase, criterion);
        }
    }

    for variable in &config.no_nan {
        let variable = variable.trim().to_lowercase();
        if !table.has_variable(&variable) {
            validator.skip(
                Phase::Filter,
                Some(&variable),
                format!("Variable {variable} not in metadata (skipped)"),
            );
            continue;
        }
        criteria.insert(
            Phase::Filter,
            Criterion::new(variable, Rule::Exclude(nulls.exclusion_tokens())),
        );
    }

    for given in command_line {
        let values = FactorValues::List(given.factors());
        if let Some(criterion) =
            validator.criterion(Phase::Filter, &given.variable, &given.mode, &values)?
        {
            debug!(variable = %criterion.variable, "command-line criterion accepted");
            criteria.insert(Phase::Filter, criterion);
        }
    }

    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use xcl_ingest::{CriteriaEntry, SAMPLE_ID};

    fn table() -> MetadataTable {
        let df = DataFrame::new(vec![
            Column::new(SAMPLE_ID.into(), ["s1", "s2", "s3"]),
            Column::new("antibiotic_history".into(), ["Yes", "No", "No"]),
            Column::new("col2".into(), [1.0, 2.0, 3.0]),
        ])
        .unwrap();
        MetadataTable::new(df).unwrap()
    }

    fn config(entries: &[(Phase, &str, &[&str])]) -> CriteriaConfig {
        CriteriaConfig {
            entries: entries
                .iter()
                .map(|(phase, key, values)| CriteriaEntry {
                    phase: *phase,
                    key: key.to_string(),
                    values: FactorValues::List(values.iter().map(|v| v.to_string()).collect()),
                })
                .collect(),
            no_nan: Vec::new(),
        }
    }

    fn build(config: &CriteriaConfig) -> (CriteriaSet, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let criteria = build_criteria(
            config,
            &[],
            &table(),
            &NullVocabulary::new(["missing"]),
            &mut diagnostics,
        )
        .unwrap();
        (criteria, diagnostics)
    }

    #[test]
    fn partial_match_keeps_common_factors() {
        let (criteria, diagnostics) = build(&config(&[(
            Phase::Filter,
            "antibiotic_history,1",
            &["Yes", "No", "New"],
        )]));
        assert_eq!(
            criteria.phase(Phase::Filter)[0].rule,
            Rule::Include(vec!["No".to_string(), "Yes".to_string()])
        );
        assert_eq!(
            diagnostics.messages(),
            vec!["[Warning] Subset values for variable antibiotic_history for not in table\n - New"]
        );
    }

    #[test]
    fn key_without_comma_is_skipped() {
        let (criteria, diagnostics) = build(&config(&[(Phase::Init, "col+0", &["x"])]));
        assert!(criteria.is_empty());
        assert_eq!(
            diagnostics.messages(),
            vec!["Must have a metadata variable and a numeric separated by a comma (\",\")"]
        );
    }

    #[test]
    fn variable_names_are_case_insensitive() {
        let (criteria, diagnostics) = build(&config(&[(Phase::Init, "Antibiotic_History,0", &["Yes"])]));
        assert!(diagnostics.is_empty());
        assert_eq!(criteria.phase(Phase::Init)[0].variable, "antibiotic_history");
    }

    #[test]
    fn rejects_bad_mode_and_unknown_variable() {
        let (criteria, diagnostics) = build(&config(&[
            (Phase::Init, "antibiotic_history,5", &["Yes"]),
            (Phase::Init, "weight,1", &["1"]),
        ]));
        assert!(criteria.is_empty());
        assert_eq!(
            diagnostics.messages(),
            vec![
                "Numeric indicator not \"0\", \"1\" or \"2\" (5) (antibiotic_history skipped)",
                "Variable weight not in metadata (skipped)",
            ]
        );
    }

    #[test]
    fn scalar_factors_are_skipped() {
        let config = CriteriaConfig {
            entries: vec![CriteriaEntry {
                phase: Phase::Add,
                key: "antibiotic_history,1".to_string(),
                values: FactorValues::Scalar("Yes".to_string()),
            }],
            no_nan: Vec::new(),
        };
        let (criteria, diagnostics) = build(&config);
        assert!(criteria.is_empty());
        assert_eq!(
            diagnostics.messages(),
            vec!["Values to subset for must be in a list format (antibiotic_history skipped)"]
        );
    }

    #[test]
    fn range_needs_two_bounds() {
        let (criteria, diagnostics) = build(&config(&[
            (Phase::Filter, "col2,2", &["1"]),
            (Phase::Filter, "col2,2", &["None", "None"]),
        ]));
        assert!(criteria.is_empty());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.messages()[1],
            "[Warning] Both numerical bounds for col2 are \"None\" (skipping)"
        );
    }

    #[test]
    fn unmatched_factors_are_skipped() {
        let (criteria, diagnostics) =
            build(&config(&[(Phase::Filter, "antibiotic_history,0", &["Maybe"])]));
        assert!(criteria.is_empty());
        assert_eq!(
            diagnostics.messages(),
            vec!["Subset values for variable antibiotic_history not in table (skipped)"]
        );
    }

    #[test]
    fn nulls_sentinel_expands_to_vocabulary() {
        let (criteria, diagnostics) = build(&config(&[(
            Phase::Filter,
            "antibiotic_history,0",
            &["Yes", "NULLS"],
        )]));
        assert!(diagnostics.is_empty());
        assert_eq!(
            criteria.phase(Phase::Filter)[0].rule,
            Rule::Exclude(vec!["Yes".to_string(), "missing".to_string()])
        );
    }

    #[test]
    fn nulls_sentinel_needs_a_matching_factor() {
        for values in [&["NULLS"][..], &["Maybe", "NULLS"][..]] {
            let (criteria, diagnostics) =
                build(&config(&[(Phase::Filter, "antibiotic_history,0", values)]));
            assert!(criteria.is_empty(), "{values:?} built a criterion");
            assert_eq!(
                diagnostics.messages(),
                vec!["Subset values for variable antibiotic_history not in table (skipped)"]
            );
        }
    }

    #[test]
    fn no_nan_and_command_line_go_to_filter() {
        let mut config = config(&[]);
        config.no_nan = vec!["col2".to_string(), "absent".to_string()];
        let mut diagnostics = Diagnostics::new();
        let criteria = build_criteria(
            &config,
            &[CommandLineCriterion::new("col2", "2", "1.5/None")],
            &table(),
            &NullVocabulary::new(["missing"]),
            &mut diagnostics,
        )
        .unwrap();

        let filter = criteria.phase(Phase::Filter);
        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter[0].rule,
            Rule::Exclude(vec!["missing".to_string(), "nan".to_string()])
        );
        assert_eq!(
            filter[1].rule,
            Rule::Range(RangeBounds::new(Some(1.5), None))
        );
        assert_eq!(
            diagnostics.messages(),
            vec!["Variable absent not in metadata (skipped)"]
        );
    }

    #[test]
    fn later_entry_overwrites_same_key() {
        let (criteria, _) = build(&config(&[
            (Phase::Filter, "antibiotic_history,1", &["Yes"]),
            (Phase::Filter, "antibiotic_history,1", &["No"]),
        ]));
        assert_eq!(
            criteria.phase(Phase::Filter),
            &[Criterion::new(
                "antibiotic_history",
                Rule::Include(vec!["No".to_string()])
            )]
        );
    }
}
