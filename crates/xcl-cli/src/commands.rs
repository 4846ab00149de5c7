use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tracing::info_span;

use xcl_cli::pipeline::{
    RunOptions, RunOutcome, inspect_dtypes, parse_command_line_criteria, run,
};

use crate::cli::{DtypesArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_selection(args: &RunArgs) -> Result<RunOutcome> {
    let options = RunOptions {
        metadata_file: args.metadata_file.clone(),
        criteria_file: args.criteria.clone(),
        command_line: parse_command_line_criteria(&args.criterion)?,
        plot_groups_file: args.plot_groups.clone(),
        nulls_file: args.nulls_file.clone(),
        included: args.included.clone(),
        excluded: args.excluded.clone(),
        visualization: args.visualization.clone(),
        dry_run: args.dry_run,
    };
    run(&options)
}

pub fn run_dtypes(args: &DtypesArgs) -> Result<()> {
    let span = info_span!("dtypes", metadata = %args.metadata_file.display());
    let _guard = span.enter();
    let dtypes = inspect_dtypes(&args.metadata_file, args.nulls_file.as_deref())
        .context("inspect dtypes")?;
    let mut table = Table::new();
    table.set_header(vec!["Variable", "Dtype", "Kind"]);
    apply_table_style(&mut table);
    for (variable, dtype) in dtypes.iter() {
        let kind = if dtype.is_numeric() {
            "numeric"
        } else {
            "categorical"
        };
        table.add_row(vec![Cell::new(variable), Cell::new(dtype), Cell::new(kind)]);
    }
    println!("{table}");
    Ok(())
}
