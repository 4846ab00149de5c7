//! Inclusion/exclusion criteria engine.
//!
//! - [`infer_dtypes`] classifies every variable as integer, float or categorical.
//! - [`build_criteria`] validates configured and command-line criteria against
//!   the table, producing a [`CriteriaSet`](xcl_model::CriteriaSet) and
//!   diagnostics.
//! - [`apply_criteria`] runs the `init`, `add` and `filter` phases and records
//!   the flowchart.

pub mod apply;
pub mod criteria;
pub mod dtypes;
mod error;

pub use apply::{apply_criteria, apply_phase, do_filtering, excluded_samples};
pub use criteria::{CommandLineCriterion, build_criteria};
pub use dtypes::{VariableDtypes, infer_dtypes, split_variables};
pub use error::{CoreError, Result};
