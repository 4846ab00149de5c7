//! Three-phase criteria application and flowchart recording.

use std::collections::HashSet;

use tracing::{debug, info};
use xcl_ingest::MetadataTable;
use xcl_model::{
    CriteriaSet, Criterion, Diagnostic, Diagnostics, Flowchart, FlowchartStep, MISSING_TEXT, Phase,
    Rule,
};

use crate::error::{CoreError, Result};

/// Apply one criterion. Returns `None` when the criterion cannot apply to
/// this table; a diagnostic says why and the caller keeps its rows.
pub fn do_filtering(
    table: &MetadataTable,
    criterion: &Criterion,
    numeric: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<Option<MetadataTable>> {
    let variable = criterion.variable.as_str();
    let keep: Vec<bool> = match &criterion.rule {
        Rule::Exclude(factors) => {
            let factors: HashSet<String> = factors.iter().map(|f| f.to_lowercase()).collect();
            table
                .text_values(variable)?
                .into_iter()
                .map(|value| {
                    let text = value.as_deref().unwrap_or(MISSING_TEXT).to_lowercase();
                    !factors.contains(&text)
                })
                .collect()
        }
        Rule::Include(factors) => {
            let factors: HashSet<&str> = factors.iter().map(String::as_str).collect();
            table
                .text_values(variable)?
                .into_iter()
                .map(|value| value.is_some_and(|text| factors.contains(text.as_str())))
                .collect()
        }
        Rule::Range(bounds) => {
            if !numeric.iter().any(|name| name == variable) {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Metadata variable {variable} is not numerical (skipping)"
                    ))
                    .with_variable(variable),
                );
                return Ok(None);
            }
            if bounds.is_unbounded() {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "[Warning] Both numerical bounds for {variable} are \"None\" (skipping)"
                    ))
                    .with_variable(variable),
                );
                return Ok(None);
            }
            table
                .f64_values(variable)?
                .into_iter()
                .map(|value| bounds.admits(value))
                .collect()
        }
    };
    Ok(Some(table.filter(&keep)?))
}

/// Apply a phase's criteria in order, starting from `table`.
///
/// The trace opens with a `"{phase} metadata"` row holding the input count,
/// added with the first criterion that applies; skipped criteria add no rows.
pub fn apply_phase(
    table: &MetadataTable,
    phase: Phase,
    criteria: &[Criterion],
    numeric: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<(Vec<FlowchartStep>, MetadataTable)> {
    let mut steps = Vec::new();
    let mut included = table.clone();
    for criterion in criteria {
        let mut skipped = Diagnostics::new();
        let Some(next) = do_filtering(&included, criterion, numeric, &mut skipped)? else {
            for diagnostic in skipped.into_vec() {
                diagnostics.push(diagnostic.with_phase(phase));
            }
            continue;
        };
        included = next;
        if steps.is_empty() {
            steps.push(FlowchartStep::phase_start(phase, table.height()));
        }
        let step = FlowchartStep::for_criterion(criterion, included.height());
        debug!(%phase, step = %step.label, samples = step.samples, "criterion applied");
        steps.push(step);
    }
    Ok((steps, included))
}

/// Run `init`, then `add` and `filter` each from the `init` result, and merge.
///
/// The included table is the `filter` result followed by the `add`-only
/// samples. When `add` contributes rows, the `filter` trace gains a closing
/// `"add" samples` row.
pub fn apply_criteria(
    table: &MetadataTable,
    criteria: &CriteriaSet,
    numeric: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<(Flowchart, MetadataTable)> {
    if criteria.is_empty() {
        return Err(CoreError::NoCriteria);
    }
    let mut flowchart = Flowchart::new();
    let mut run = |input: &MetadataTable, phase: Phase, diagnostics: &mut Diagnostics| {
        let (steps, output) =
            apply_phase(input, phase, criteria.phase(phase), numeric, diagnostics)?;
        flowchart.record_phase(phase, steps);
        Ok::<_, CoreError>(output)
    };

    let base = if criteria.has_phase(Phase::Init) {
        run(table, Phase::Init, diagnostics)?
    } else {
        table.clone()
    };
    let added = if criteria.has_phase(Phase::Add) {
        Some(run(&base, Phase::Add, diagnostics)?)
    } else {
        None
    };
    let filtered = if criteria.has_phase(Phase::Filter) {
        run(&base, Phase::Filter, diagnostics)?
    } else {
        base.clone()
    };

    let included = match added {
        Some(added) if added.height() > 0 => {
            merge_added(&filtered, &added, &mut flowchart, diagnostics)?
        }
        _ => filtered,
    };
    info!(
        samples = table.height(),
        included = included.height(),
        "criteria applied"
    );
    Ok((flowchart, included))
}

fn merge_added(
    filtered: &MetadataTable,
    added: &MetadataTable,
    flowchart: &mut Flowchart,
    diagnostics: &mut Diagnostics,
) -> Result<MetadataTable> {
    let kept: HashSet<String> = filtered.sample_ids()?.into_iter().collect();
    let added_ids = added.sample_ids()?;
    let common = added_ids.iter().filter(|id| kept.contains(*id)).count();
    let restored = added_ids.len() - common;

    if common > 0 {
        diagnostics.push(
            Diagnostic::info(format!(
                "{common} samples not removed by criteria of \"init\"/\"filter\" steps re-added \
                 by criteria of \"add\" step (not to worry: duplicates are dropped)."
            ))
            .with_phase(Phase::Add),
        );
    }
    if restored > 0 {
        diagnostics.push(
            Diagnostic::info(format!(
                "{restored} samples removed by criteria of \"filter\" step re-added by criteria \
                 of \"add\" step"
            ))
            .with_phase(Phase::Add),
        );
    }

    let included = filtered.union(added)?;
    flowchart.push(
        Phase::Filter,
        FlowchartStep::add_merge(included.height(), restored),
    );
    Ok(included)
}

/// Rows of `table` whose sample is not in `included`, in original order.
pub fn excluded_samples(table: &MetadataTable, included: &MetadataTable) -> Result<MetadataTable> {
    let included: HashSet<String> = included.sample_ids()?.into_iter().collect();
    Ok(table.excluding(&included)?)
}
