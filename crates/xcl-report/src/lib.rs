//! Report outputs for a criteria run: chart records, the interactive
//! visualization, and the included/excluded sample tables.

mod error;
pub mod html;
pub mod records;
mod tables;

pub use error::{ReportError, Result};
pub use html::{chart_spec, render_html, visualization_path, write_visualization};
pub use records::{
    ChartData, FlowchartRecord, SampleRecord, UNIQUE_MARK, build_chart_data, flowchart_records,
    sorted_factors,
};
pub use tables::write_table;
