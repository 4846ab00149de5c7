//! Data model for the inclusion/exclusion criteria engine.
//!
//! Plain types shared by ingest, core processing, reporting and the CLI.
//! Nothing in this crate performs I/O.

pub mod criteria;
pub mod diagnostics;
pub mod dtype;
pub mod error;
pub mod flowchart;
pub mod nulls;

pub use criteria::{CriteriaSet, Criterion, CriterionMode, Phase, RangeBounds, Rule};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use dtype::Dtype;
pub use error::{ModelError, Result};
pub use flowchart::{Flowchart, FlowchartStep};
pub use nulls::{MISSING_TEXT, NULLS_SENTINEL, NullVocabulary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flowchart_serializes_mode_tokens() {
        let criterion = Criterion::new("age", Rule::Range(RangeBounds::new(Some(18.0), None)));
        let step = FlowchartStep::for_criterion(&criterion, 12);
        let json = serde_json::to_value(&step).expect("serialize step");
        assert_eq!(json["label"], "Range_age");
        assert_eq!(json["mode"], "2");
        assert_eq!(json["values"], "18\nNone");
    }

    #[test]
    fn diagnostics_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::skipped("first"));
        diagnostics.push(Diagnostic::warning("second"));
        diagnostics.push(Diagnostic::info("third"));
        assert_eq!(diagnostics.messages(), vec!["first", "second", "third"]);
        assert_eq!(diagnostics.count(DiagnosticSeverity::Skipped), 1);
    }
}
