//! Typed inclusion/exclusion criteria.
//!
//! A criterion pairs a metadata variable with a [`Rule`]. Criteria are
//! grouped per [`Phase`] and keep their declaration order; a later criterion
//! with the same `(variable, mode)` key replaces the earlier one in place.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Numeric indicator of a criterion as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CriterionMode {
    /// `0`: drop rows whose value is one of the factors.
    #[serde(rename = "0")]
    Exclude,
    /// `1`: keep only rows whose value is one of the factors.
    #[serde(rename = "1")]
    Include,
    /// `2`: keep rows strictly inside a numeric `(min, max)` range.
    #[serde(rename = "2")]
    Range,
}

impl CriterionMode {
    pub fn token(self) -> &'static str {
        match self {
            CriterionMode::Exclude => "0",
            CriterionMode::Include => "1",
            CriterionMode::Range => "2",
        }
    }
}

impl FromStr for CriterionMode {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "0" => Ok(CriterionMode::Exclude),
            "1" => Ok(CriterionMode::Include),
            "2" => Ok(CriterionMode::Range),
            other => Err(ModelError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for CriterionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Group of criteria applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Narrow the full table first.
    Init,
    /// Re-include samples, branched off the `init` result.
    Add,
    /// Further exclusion, branched off the `init` result.
    Filter,
}

impl Phase {
    /// Execution order.
    pub const ALL: [Phase; 3] = [Phase::Init, Phase::Add, Phase::Filter];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Add => "add",
            Phase::Filter => "filter",
        }
    }
}

impl FromStr for Phase {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "init" => Ok(Phase::Init),
            "add" => Ok(Phase::Add),
            "filter" => Ok(Phase::Filter),
            other => Err(ModelError::InvalidPhase(other.to_string())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open numeric interval; a missing bound is written `"None"`.
///
/// Bounds parsed from configuration keep the tokens as written, for display.
/// Equality compares the numeric bounds only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    written: Option<[String; 2]>,
}

impl PartialEq for RangeBounds {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl RangeBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            written: None,
        }
    }

    /// Parse the two-token form used in configuration (`["1.5", "None"]`).
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        Ok(Self {
            min: parse_bound(min)?,
            max: parse_bound(max)?,
            written: Some([min.trim().to_string(), max.trim().to_string()]),
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether a value passes both bound checks. Missing values never pass a
    /// bounded check.
    pub fn admits(&self, value: Option<f64>) -> bool {
        if let Some(min) = self.min {
            if !value.is_some_and(|v| v > min) {
                return false;
            }
        }
        if let Some(max) = self.max {
            if !value.is_some_and(|v| v < max) {
                return false;
            }
        }
        true
    }

    /// Bounds as configuration tokens, as written when parsed.
    pub fn tokens(&self) -> [String; 2] {
        match &self.written {
            Some(written) => written.clone(),
            None => [bound_token(self.min), bound_token(self.max)],
        }
    }
}

fn parse_bound(token: &str) -> Result<Option<f64>> {
    let trimmed = token.trim();
    if trimmed == "None" {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ModelError::InvalidRangeBound(trimmed.to_string()))
}

fn bound_token(bound: Option<f64>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

/// What a criterion does with the rows of its variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum Rule {
    Exclude(Vec<String>),
    Include(Vec<String>),
    Range(RangeBounds),
}

impl Rule {
    pub fn mode(&self) -> CriterionMode {
        match self {
            Rule::Exclude(_) => CriterionMode::Exclude,
            Rule::Include(_) => CriterionMode::Include,
            Rule::Range(_) => CriterionMode::Range,
        }
    }

    /// Values in configuration order (factors, or the two range tokens).
    pub fn values(&self) -> Vec<String> {
        match self {
            Rule::Exclude(factors) | Rule::Include(factors) => factors.clone(),
            Rule::Range(bounds) => bounds.tokens().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub variable: String,
    pub rule: Rule,
}

impl Criterion {
    pub fn new(variable: impl Into<String>, rule: Rule) -> Self {
        Self {
            variable: variable.into(),
            rule,
        }
    }

    pub fn mode(&self) -> CriterionMode {
        self.rule.mode()
    }

    pub fn key(&self) -> (&str, CriterionMode) {
        (self.variable.as_str(), self.mode())
    }

    /// Flowchart label for the step this criterion produces.
    pub fn step_label(&self) -> String {
        match self.mode() {
            CriterionMode::Exclude => format!("No_{}", self.variable),
            CriterionMode::Include => self.variable.clone(),
            CriterionMode::Range => format!("Range_{}", self.variable),
        }
    }

    /// Newline-joined values, as shown in the flowchart.
    pub fn values_repr(&self) -> String {
        self.rule.values().join("\n")
    }
}

/// Normalized criteria for the three phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaSet {
    init: Vec<Criterion>,
    add: Vec<Criterion>,
    filter: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria of a phase in declaration order; empty when the phase is absent.
    pub fn phase(&self, phase: Phase) -> &[Criterion] {
        match phase {
            Phase::Init => &self.init,
            Phase::Add => &self.add,
            Phase::Filter => &self.filter,
        }
    }

    pub fn has_phase(&self, phase: Phase) -> bool {
        !self.phase(phase).is_empty()
    }

    /// Insert a criterion, replacing in place any criterion of the same phase
    /// with the same `(variable, mode)` key.
    pub fn insert(&mut self, phase: Phase, criterion: Criterion) {
        let criteria = self.phase_mut(phase);
        match criteria
            .iter_mut()
            .find(|existing| existing.key() == criterion.key())
        {
            Some(existing) => *existing = criterion,
            None => criteria.push(criterion),
        }
    }

    pub fn len(&self) -> usize {
        self.init.len() + self.add.len() + self.filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(phase, criterion)` pair in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (Phase, &Criterion)> {
        Phase::ALL
            .into_iter()
            .flat_map(move |phase| self.phase(phase).iter().map(move |c| (phase, c)))
    }

    /// Variables referenced by at least one criterion.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.iter().map(|(_, c)| c.variable.as_str()).collect()
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Criterion> {
        match phase {
            Phase::Init => &mut self.init,
            Phase::Add => &mut self.add,
            Phase::Filter => &mut self.filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn include(variable: &str, factors: &[&str]) -> Criterion {
        Criterion::new(
            variable,
            Rule::Include(factors.iter().map(|f| f.to_string()).collect()),
        )
    }

    #[test]
    fn parses_mode_tokens() {
        assert_eq!("0".parse::<CriterionMode>(), Ok(CriterionMode::Exclude));
        assert_eq!(" 2".parse::<CriterionMode>(), Ok(CriterionMode::Range));
        assert_eq!(
            "9".parse::<CriterionMode>(),
            Err(ModelError::InvalidMode("9".to_string()))
        );
    }

    #[test]
    fn range_bounds_are_exclusive() {
        let bounds = RangeBounds::parse("1.5", "3").unwrap();
        assert!(!bounds.admits(Some(1.5)));
        assert!(bounds.admits(Some(2.0)));
        assert!(!bounds.admits(Some(3.0)));
        assert!(!bounds.admits(None));
    }

    #[test]
    fn range_bounds_tokens() {
        let bounds = RangeBounds::parse("None", "10").unwrap();
        assert_eq!(bounds.tokens(), ["None".to_string(), "10".to_string()]);
        assert!(RangeBounds::parse("None", "None").unwrap().is_unbounded());
        assert!(RangeBounds::parse("low", "10").is_err());
    }

    #[test]
    fn parsed_bounds_keep_written_tokens() {
        let bounds = RangeBounds::parse(" 1e3", "20.0").unwrap();
        assert_eq!(bounds.tokens(), ["1e3".to_string(), "20.0".to_string()]);
        assert_eq!(bounds, RangeBounds::new(Some(1000.0), Some(20.0)));
        assert_eq!(
            RangeBounds::new(Some(1000.0), Some(20.0)).tokens(),
            ["1000".to_string(), "20".to_string()]
        );

        let criterion = Criterion::new("age", Rule::Range(bounds));
        assert_eq!(criterion.values_repr(), "1e3\n20.0");
    }

    #[test]
    fn step_labels_follow_mode() {
        let exclude = Criterion::new("abx", Rule::Exclude(vec!["Yes".to_string()]));
        assert_eq!(exclude.step_label(), "No_abx");
        assert_eq!(include("abx", &["No"]).step_label(), "abx");
    }

    #[test]
    fn insert_replaces_same_key_in_place() {
        let mut set = CriteriaSet::new();
        set.insert(Phase::Filter, include("a", &["x"]));
        set.insert(Phase::Filter, include("b", &["y"]));
        set.insert(Phase::Filter, include("a", &["z"]));

        let filter = set.phase(Phase::Filter);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter[0], include("a", &["z"]));
        assert_eq!(filter[1].variable, "b");
        assert!(!set.has_phase(Phase::Init));
    }

    #[test]
    fn iter_follows_phase_order() {
        let mut set = CriteriaSet::new();
        set.insert(Phase::Filter, include("c", &["x"]));
        set.insert(Phase::Init, include("a", &["x"]));
        set.insert(Phase::Add, include("b", &["x"]));
        let order: Vec<_> = set.iter().map(|(p, c)| (p, c.variable.as_str())).collect();
        assert_eq!(
            order,
            vec![(Phase::Init, "a"), (Phase::Add, "b"), (Phase::Filter, "c")]
        );
    }
}
