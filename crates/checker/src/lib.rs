//! Documentation checker for provider-doc-lint
//!
//! Compares parsed resource documents with resource schemas and reports
//! every discrepancy as a typed [`Diagnostic`]. A corpus run spreads the
//! resources of a [`SchemaSource`](provider_doc_lint_schema::SchemaSource)
//! over scoped worker threads.
//!
//! # Examples
//!
//! ```no_run
//! use provider_doc_lint_checker::{render_report, Linter, ReportOptions};
//! use provider_doc_lint_common::LintConfig;
//! use provider_doc_lint_schema::DescriptionSource;
//! use std::path::Path;
//!
//! let source = DescriptionSource::load(Path::new("schemas")).expect("Failed to load schemas");
//! let run = Linter::new(LintConfig::default()).run(&source, Path::new("website/docs/r"));
//!
//! print!("{}", render_report(&run, &ReportOptions::default()).expect("Render failed"));
//! ```

mod cross_check;
mod diagnostic;
mod engine;
mod fuzzy;
mod report;
mod upgrade_guide;

pub use cross_check::{CrossChecker, TIMEOUTS_PATH};
pub use diagnostic::{Diagnostic, DiagnosticKind, RequirednessExpectation};
pub use engine::{
    locate_document, FixHook, FixSummary, LintRun, Linter, ResourceReport, DOCUMENT_EXTENSIONS,
};
pub use fuzzy::{levenshtein, merge_misspellings, MAX_MISSPELLING_DISTANCE};
pub use report::{render_json, render_report, ReportOptions};
pub use upgrade_guide::UpgradeGuide;
