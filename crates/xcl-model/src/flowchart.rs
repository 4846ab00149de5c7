use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::criteria::{Criterion, CriterionMode, Phase};

/// Sample count recorded after one filtering step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowchartStep {
    pub label: String,
    pub samples: usize,
    pub variable: Option<String>,
    pub values: Option<String>,
    pub mode: Option<CriterionMode>,
}

impl FlowchartStep {
    /// Pre-filter row that opens a phase.
    pub fn phase_start(phase: Phase, samples: usize) -> Self {
        Self {
            label: format!("{phase} metadata"),
            samples,
            variable: None,
            values: None,
            mode: None,
        }
    }

    pub fn for_criterion(criterion: &Criterion, samples: usize) -> Self {
        Self {
            label: criterion.step_label(),
            samples,
            variable: Some(criterion.variable.clone()),
            values: Some(criterion.values_repr()),
            mode: Some(criterion.mode()),
        }
    }

    /// Closing row of the `filter` trace when `add` brought samples back.
    pub fn add_merge(samples: usize, added: usize) -> Self {
        Self {
            label: "\"add\" samples".to_string(),
            samples,
            variable: Some(format!("adding {added} samples")),
            values: Some("(see \"add\" criteria)".to_string()),
            mode: None,
        }
    }
}

/// Ordered trace of sample counts, grouped by phase.
///
/// A phase appears only if it ran; its trace may still be empty when every
/// one of its criteria was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flowchart {
    phases: BTreeMap<Phase, Vec<FlowchartStep>>,
}

impl Flowchart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_phase(&mut self, phase: Phase, steps: Vec<FlowchartStep>) {
        self.phases.insert(phase, steps);
    }

    pub fn push(&mut self, phase: Phase, step: FlowchartStep) {
        self.phases.entry(phase).or_default().push(step);
    }

    pub fn steps(&self, phase: Phase) -> Option<&[FlowchartStep]> {
        self.phases.get(&phase).map(Vec::as_slice)
    }

    /// Steps in application order, tagged with their phase.
    pub fn iter(&self) -> impl Iterator<Item = (Phase, &FlowchartStep)> {
        self.phases
            .iter()
            .flat_map(|(phase, steps)| steps.iter().map(move |step| (*phase, step)))
    }

    pub fn len(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
