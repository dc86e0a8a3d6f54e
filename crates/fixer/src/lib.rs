//! Mechanical fixes for documentation diagnostics
//!
//! [`DocumentFixer`] rewrites the lines a diagnostic points at so the
//! document states what the schema declares, and synthesizes missing
//! timeout bullets from templates. Lines no diagnostic touches are left
//! byte-for-byte alone, line endings included.
//!
//! # Examples
//!
//! ```
//! use provider_doc_lint_checker::{Diagnostic, DiagnosticKind};
//! use provider_doc_lint_fixer::DocumentFixer;
//!
//! let fixer = DocumentFixer::new().unwrap();
//! let text = "## Arguments Reference\n\n* `name` - (Required) The name.\n";
//! let diagnostic = Diagnostic::new(
//!     "azurerm_example",
//!     DiagnosticKind::ForceNew { expected: true },
//!     "name",
//!     Some(3),
//! );
//!
//! let outcome = fixer.fix_text(text, &[diagnostic]).unwrap();
//! assert_eq!(outcome.applied, 1);
//! assert!(outcome
//!     .text
//!     .contains("The name. Changing this forces a new resource to be created.\n"));
//! ```

mod lines;
mod patch;
mod templates;
mod timeouts;

pub use patch::{format_values, FORCE_NEW_SENTENCE};

use lines::DocumentLines;
use provider_doc_lint_checker::{Diagnostic, DiagnosticKind, FixHook, FixSummary};
use provider_doc_lint_common::Result;
use provider_doc_lint_parser::{normalize_lines, tokenize, DocumentBuilder, LineKind};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::Tera;
use tracing::{debug, info};

/// Result of fixing one document
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    /// Fixed document text; identical to the input when nothing applied
    pub text: String,
    pub applied: usize,
    /// Diagnostics left for a human
    pub unfixable: Vec<Diagnostic>,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Applies diagnostics to document text
pub struct DocumentFixer {
    tera: Tera,
}

impl DocumentFixer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: templates::load_templates()?,
        })
    }

    /// Fix `text` for the given diagnostics of one document
    ///
    /// Skipped diagnostics are ignored. Line numbers refer to `text`.
    pub fn fix_text(&self, text: &str, diagnostics: &[Diagnostic]) -> Result<FixOutcome> {
        let items = tokenize(&normalize_lines(text));
        // First line of a bullet -> its last line
        let spans: HashMap<usize, usize> = items
            .iter()
            .filter(|item| matches!(item.kind, LineKind::FieldBullet | LineKind::TimeoutBullet))
            .map(|item| (item.from_line, item.to_line))
            .collect();

        let mut lines = DocumentLines::new(text);
        let mut applied = 0;
        let mut unfixable = Vec::new();
        let mut missing_timeouts = Vec::new();
        let mut resource_type = None;

        for diagnostic in diagnostics.iter().filter(|d| !d.skip) {
            if !diagnostic.kind.is_fixable() {
                unfixable.push(diagnostic.clone());
                continue;
            }

            let patched = match (diagnostic.line, &diagnostic.kind) {
                (
                    None,
                    DiagnosticKind::Timeout {
                        op,
                        expected_seconds,
                        ..
                    },
                ) => {
                    missing_timeouts.push((*op, *expected_seconds));
                    resource_type.get_or_insert(diagnostic.resource_type.as_str());
                    continue;
                }
                (Some(line), kind) => {
                    let last = spans.get(&line).copied().unwrap_or(line);
                    lines
                        .item_mut(line, last)
                        .is_some_and(|item| patch::apply(kind, item))
                }
                (None, _) => false,
            };

            if patched {
                debug!(path = %diagnostic.path, kind = diagnostic.kind.name(), "Applied fix");
                applied += 1;
            } else {
                debug!(path = %diagnostic.path, kind = diagnostic.kind.name(), "No fix applied");
                unfixable.push(diagnostic.clone());
            }
        }

        if let Some(resource_type) = resource_type {
            let doc = DocumentBuilder::new(resource_type).build(&items);
            applied +=
                timeouts::insert_missing(&self.tera, &mut lines, &doc, &spans, &missing_timeouts)?;
        }

        let text = if applied == 0 {
            text.to_string()
        } else {
            lines.join()
        };

        Ok(FixOutcome {
            text,
            applied,
            unfixable,
        })
    }

    /// Fix a document in place; the file is only written when a fix applied
    pub fn fix_file(&self, path: &Path, diagnostics: &[Diagnostic]) -> Result<FixOutcome> {
        let text = fs::read_to_string(path)?;
        let outcome = self.fix_text(&text, diagnostics)?;

        if outcome.changed() && outcome.text != text {
            fs::write(path, &outcome.text)?;
            info!(
                path = %path.display(),
                applied = outcome.applied,
                unfixable = outcome.unfixable.len(),
                "Fixed document"
            );
        }

        Ok(outcome)
    }
}

impl FixHook for DocumentFixer {
    fn fix(&self, path: &Path, diagnostics: &[Diagnostic]) -> Result<FixSummary> {
        let outcome = self.fix_file(path, diagnostics)?;
        Ok(FixSummary {
            applied: outcome.applied,
            unfixable: outcome.unfixable.len(),
        })
    }
}
