//! Run orchestration: ingest, dtype inference, criteria, application, report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use xcl_core::{
    CommandLineCriterion, VariableDtypes, apply_criteria, build_criteria, excluded_samples,
    infer_dtypes, split_variables,
};
use xcl_ingest::{
    CriteriaConfig, MetadataTable, PlotGroups, load_null_vocabulary, read_criteria_config,
    read_metadata_table, read_plot_groups,
};
use xcl_model::{Diagnostics, Flowchart, NullVocabulary};
use xcl_report::{build_chart_data, write_table, write_visualization};

/// Paths and flags for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub metadata_file: PathBuf,
    pub criteria_file: Option<PathBuf>,
    pub command_line: Vec<CommandLineCriterion>,
    pub plot_groups_file: Option<PathBuf>,
    pub nulls_file: Option<PathBuf>,
    pub included: PathBuf,
    pub excluded: Option<PathBuf>,
    pub visualization: PathBuf,
    pub dry_run: bool,
}

/// Group flat `-p` values into criteria of three.
pub fn parse_command_line_criteria(values: &[String]) -> Result<Vec<CommandLineCriterion>> {
    if values.len() % 3 != 0 {
        bail!("each --p-criterion takes a variable, a mode and values");
    }
    Ok(values
        .chunks_exact(3)
        .map(|chunk| CommandLineCriterion::new(&chunk[0], &chunk[1], &chunk[2]))
        .collect())
}

/// Files written by a run; all `None` on a dry run.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub included: Option<PathBuf>,
    pub excluded: Option<PathBuf>,
    pub visualization: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub flowchart: Flowchart,
    pub diagnostics: Diagnostics,
    pub samples: usize,
    pub included: usize,
    pub excluded: usize,
    pub outputs: OutputPaths,
}

pub struct IngestResult {
    pub table: MetadataTable,
    pub criteria: CriteriaConfig,
    pub plot_groups: PlotGroups,
    pub nulls: NullVocabulary,
}

/// Load the metadata table, the optional configuration files and the null
/// vocabulary.
pub fn ingest(options: &RunOptions) -> Result<IngestResult> {
    let nulls = load_null_vocabulary(options.nulls_file.as_deref())
        .context("load null vocabulary")?;
    let table = read_metadata_table(&options.metadata_file).with_context(|| {
        format!(
            "read metadata table {}",
            options.metadata_file.display()
        )
    })?;
    let criteria = read_criteria_config(options.criteria_file.as_deref())
        .context("read criteria configuration")?;
    let plot_groups = read_plot_groups(options.plot_groups_file.as_deref())
        .context("read plot groups")?;
    Ok(IngestResult {
        table,
        criteria,
        plot_groups,
        nulls,
    })
}

/// Load a table and infer its variable dtypes.
pub fn inspect_dtypes(metadata_file: &Path, nulls_file: Option<&Path>) -> Result<VariableDtypes> {
    let nulls = load_null_vocabulary(nulls_file).context("load null vocabulary")?;
    let table = read_metadata_table(metadata_file)
        .with_context(|| format!("read metadata table {}", metadata_file.display()))?;
    let (_, dtypes) = infer_dtypes(&table, &nulls).context("infer dtypes")?;
    Ok(dtypes)
}

pub fn run(options: &RunOptions) -> Result<RunOutcome> {
    let run_span = info_span!("run", metadata = %options.metadata_file.display());
    let _run_guard = run_span.enter();

    // =========================================================================
    // Stage 1: Ingest
    // =========================================================================
    let ingest_start = Instant::now();
    let IngestResult {
        table,
        criteria: config,
        plot_groups,
        nulls,
    } = info_span!("ingest").in_scope(|| ingest(options))?;
    info!(
        samples = table.height(),
        variables = table.variables().len(),
        config_entries = config.entries.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    // =========================================================================
    // Stage 2: Dtypes
    // =========================================================================
    let dtypes_start = Instant::now();
    let (table, dtypes) = info_span!("dtypes")
        .in_scope(|| infer_dtypes(&table, &nulls))
        .context("infer dtypes")?;
    info!(
        numeric = dtypes.numeric().len(),
        variables = dtypes.len(),
        duration_ms = dtypes_start.elapsed().as_millis(),
        "dtypes inferred"
    );

    // =========================================================================
    // Stage 3: Criteria
    // =========================================================================
    let criteria_start = Instant::now();
    let mut diagnostics = Diagnostics::new();
    let criteria = info_span!("criteria")
        .in_scope(|| {
            build_criteria(
                &config,
                &options.command_line,
                &table,
                &nulls,
                &mut diagnostics,
            )
        })
        .context("validate criteria")?;
    info!(
        criteria = criteria.len(),
        diagnostics = diagnostics.len(),
        duration_ms = criteria_start.elapsed().as_millis(),
        "criteria validated"
    );
    if criteria.is_empty() {
        for diagnostic in diagnostics.iter() {
            warn!(%diagnostic, "criterion skipped");
        }
        bail!(
            "no usable inclusion/exclusion criteria:\n - {}",
            diagnostics.messages().join("\n - ")
        );
    }

    // =========================================================================
    // Stage 4: Apply
    // =========================================================================
    let apply_start = Instant::now();
    let (numeric, categorical) = split_variables(&dtypes, &criteria);
    let (flowchart, included, excluded) = info_span!("apply")
        .in_scope(|| {
            let (flowchart, included) =
                apply_criteria(&table, &criteria, &numeric, &mut diagnostics)?;
            let excluded = excluded_samples(&table, &included)?;
            Ok::<_, xcl_core::CoreError>((flowchart, included, excluded))
        })
        .context("apply criteria")?;
    info!(
        included = included.height(),
        excluded = excluded.height(),
        steps = flowchart.len(),
        duration_ms = apply_start.elapsed().as_millis(),
        "criteria applied"
    );

    // =========================================================================
    // Stage 5: Report
    // =========================================================================
    let mut outputs = OutputPaths::default();
    if options.dry_run {
        info!("dry run: no outputs written");
    } else {
        let report_start = Instant::now();
        let report_span = info_span!("report");
        let _report_guard = report_span.enter();
        write_table(&included, &options.included).with_context(|| {
            format!("write included samples {}", options.included.display())
        })?;
        outputs.included = Some(options.included.clone());
        if let Some(path) = &options.excluded {
            write_table(&excluded, path)
                .with_context(|| format!("write excluded samples {}", path.display()))?;
            outputs.excluded = Some(path.clone());
        }
        let chart = build_chart_data(&flowchart, &included, &numeric, &categorical, &plot_groups)
            .context("build chart records")?;
        let written = write_visualization(&chart, &options.visualization).with_context(|| {
            format!("write visualization {}", options.visualization.display())
        })?;
        outputs.visualization = Some(written);
        info!(
            records = chart.samples.len(),
            duration_ms = report_start.elapsed().as_millis(),
            "report written"
        );
    }

    Ok(RunOutcome {
        flowchart,
        diagnostics,
        samples: table.height(),
        included: included.height(),
        excluded: excluded.height(),
        outputs,
    })
}
