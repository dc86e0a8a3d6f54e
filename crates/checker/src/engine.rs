//! Corpus lint orchestration

use crate::cross_check::CrossChecker;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::upgrade_guide::UpgradeGuide;
use provider_doc_lint_common::{document_stem, LintConfig, Result};
use provider_doc_lint_parser::parse_document;
use provider_doc_lint_schema::{ResourceSchema, SchemaSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

/// Document extensions tried in order
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["html.markdown", "md"];

/// Applies fixes to one document file
///
/// Implemented by the fixer; the engine calls it from the worker that owns
/// the document.
pub trait FixHook: Sync {
    fn fix(&self, path: &Path, diagnostics: &[Diagnostic]) -> Result<FixSummary>;
}

/// Outcome of fixing one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    pub applied: usize,
    /// Diagnostics that still need a manual edit
    pub unfixable: usize,
}

/// Lint result of one resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub resource_type: String,
    /// Document file, when one was found
    pub path: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    /// Schema or I/O failure that stopped this resource
    pub error: Option<String>,
    pub fix: Option<FixSummary>,
}

impl ResourceReport {
    fn new(resource_type: &str, path: Option<PathBuf>) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            path,
            diagnostics: Vec::new(),
            error: None,
            fix: None,
        }
    }

    fn failed(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Diagnostics that count against the run
    pub fn failing(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.skip)
    }
}

/// Result of a corpus run, one report per resource in resource order
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintRun {
    pub reports: Vec<ResourceReport>,
}

impl LintRun {
    pub fn failing(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reports.iter().flat_map(|r| r.failing())
    }

    pub fn failure_count(&self) -> usize {
        self.failing().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.skip)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.reports.iter().filter(|r| r.error.is_some()).count()
    }

    /// Non-skipped diagnostics per kind name
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in self.failing() {
            *counts.entry(diagnostic.kind.name()).or_insert(0) += 1;
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0 || self.error_count() > 0
    }

    pub fn applied_count(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.fix)
            .map(|f| f.applied)
            .sum()
    }

    /// Diagnostics left for manual fixing after a fix run
    pub fn unfixable_count(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.fix)
            .map(|f| f.unfixable)
            .sum()
    }
}

/// Lints a documentation corpus against a schema source
pub struct Linter {
    config: LintConfig,
    upgrade_guide: Option<UpgradeGuide>,
    workers: usize,
}

impl Linter {
    /// Create a linter; the configured upgrade guide is read on first use
    pub fn new(config: LintConfig) -> Self {
        let upgrade_guide = config.upgrade_guide.as_ref().map(UpgradeGuide::new);
        Self {
            config,
            upgrade_guide,
            workers: default_workers(),
        }
    }

    pub fn with_upgrade_guide(mut self, guide: UpgradeGuide) -> Self {
        self.upgrade_guide = Some(guide);
        self
    }

    /// Number of worker threads, at least one
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Check every included resource of `source` against `docs_dir`
    pub fn run(&self, source: &dyn SchemaSource, docs_dir: &Path) -> LintRun {
        self.execute(source, docs_dir, None)
    }

    /// Like [`Linter::run`], additionally handing each document's
    /// diagnostics to `hook`
    pub fn fix(&self, source: &dyn SchemaSource, docs_dir: &Path, hook: &dyn FixHook) -> LintRun {
        self.execute(source, docs_dir, Some(hook))
    }

    /// Check one document text against one schema
    pub fn check_text(&self, schema: &ResourceSchema, text: &str) -> Vec<Diagnostic> {
        let doc = parse_document(&schema.resource_type, text);
        CrossChecker::new(&self.config)
            .with_upgrade_guide(self.upgrade_guide.as_ref())
            .check(&doc, schema)
    }

    fn execute(
        &self,
        source: &dyn SchemaSource,
        docs_dir: &Path,
        hook: Option<&dyn FixHook>,
    ) -> LintRun {
        let mut resource_types: Vec<String> = source
            .resource_types()
            .into_iter()
            .filter(|rt| self.config.includes_resource(rt))
            .collect();
        resource_types.sort();
        resource_types.dedup();

        if resource_types.is_empty() {
            info!("No resources selected");
            return LintRun::default();
        }

        let workers = self.workers.min(resource_types.len());
        let chunk_size = resource_types.len().div_ceil(workers);
        info!(
            resources = resource_types.len(),
            workers, "Linting documentation"
        );

        let reports = thread::scope(|scope| {
            let handles: Vec<_> = resource_types
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|rt| self.lint_resource(source, docs_dir, rt, hook))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut reports = Vec::with_capacity(resource_types.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => reports.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            reports
        });

        LintRun { reports }
    }

    fn lint_resource(
        &self,
        source: &dyn SchemaSource,
        docs_dir: &Path,
        resource_type: &str,
        hook: Option<&dyn FixHook>,
    ) -> ResourceReport {
        let schema = match source.resource_schema(resource_type) {
            Ok(schema) => schema,
            Err(e) => {
                warn!(resource = resource_type, error = %e, "Invalid schema");
                return ResourceReport::new(resource_type, None).failed(e);
            }
        };

        let Some(path) = locate_document(docs_dir, resource_type) else {
            let deprecated = schema.deprecated || self.config.is_deprecated(resource_type);
            let suppressed =
                self.config
                    .is_suppressed(resource_type, None, DiagnosticKind::NoDocument.name());
            let mut report = ResourceReport::new(resource_type, None);
            report.diagnostics.push(
                Diagnostic::new(resource_type, DiagnosticKind::NoDocument, "", None)
                    .skipped(deprecated || suppressed),
            );
            return report;
        };

        let mut report = ResourceReport::new(resource_type, Some(path.clone()));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read document");
                return report.failed(e);
            }
        };

        report.diagnostics = self.check_text(&schema, &text);
        debug!(
            resource = resource_type,
            diagnostics = report.diagnostics.len(),
            "Checked document"
        );

        if let Some(hook) = hook {
            match hook.fix(&path, &report.diagnostics) {
                Ok(summary) => report.fix = Some(summary),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to fix document");
                    report.error = Some(e.to_string());
                }
            }
        }

        report
    }
}

/// Document of a resource type: `<docs_dir>/<stem>.html.markdown`, else
/// `<docs_dir>/<stem>.md`
pub fn locate_document(docs_dir: &Path, resource_type: &str) -> Option<PathBuf> {
    let stem = document_stem(resource_type);
    DOCUMENT_EXTENSIONS
        .iter()
        .map(|ext| docs_dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
