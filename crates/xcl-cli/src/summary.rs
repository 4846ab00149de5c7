use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use xcl_cli::pipeline::RunOutcome;
use xcl_model::{DiagnosticSeverity, Diagnostics, Flowchart};

pub fn print_summary(outcome: &RunOutcome) {
    println!(
        "Included: {} of {} samples ({} excluded)",
        outcome.included, outcome.samples, outcome.excluded
    );
    if let Some(path) = &outcome.outputs.included {
        println!("Included samples: {}", path.display());
    }
    if let Some(path) = &outcome.outputs.excluded {
        println!("Excluded samples: {}", path.display());
    }
    if let Some(path) = &outcome.outputs.visualization {
        println!("Visualization: {}", path.display());
    }
    println!("{}", flowchart_table(&outcome.flowchart));
    if !outcome.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        println!("{}", diagnostics_table(&outcome.diagnostics));
    }
}

pub fn flowchart_table(flowchart: &Flowchart) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Step"),
        header_cell("Samples"),
        header_cell("Variable"),
        header_cell("Values"),
        header_cell("Mode"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for (phase, step) in flowchart.iter() {
        let label = if step.mode.is_none() {
            Cell::new(&step.label).fg(Color::DarkGrey)
        } else {
            Cell::new(&step.label)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            Cell::new(phase),
            label,
            Cell::new(step.samples),
            optional_cell(step.variable.as_deref()),
            optional_cell(step.values.as_deref()),
            optional_cell(step.mode.map(|mode| mode.token())),
        ]);
    }
    table
}

pub fn diagnostics_table(diagnostics: &Diagnostics) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Phase"),
        header_cell("Variable"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for diagnostic in diagnostics {
        table.add_row(vec![
            severity_cell(diagnostic.severity),
            optional_cell(diagnostic.phase.map(|phase| phase.as_str())),
            optional_cell(diagnostic.variable.as_deref()),
            Cell::new(&diagnostic.message),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() == 4 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ]);
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    if table.column_count() == 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: DiagnosticSeverity) -> Cell {
    match severity {
        DiagnosticSeverity::Skipped => Cell::new("SKIPPED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        DiagnosticSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
        DiagnosticSeverity::Info => Cell::new("INFO").fg(Color::Cyan),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
