//! Typed discrepancies between documentation and schema

use provider_doc_lint_common::duration::format_duration;
use provider_doc_lint_common::TimeoutOp;
use provider_doc_lint_parser::FormatError;
use serde::Serialize;
use std::fmt;

/// What the documentation should say about a field's requiredness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirednessExpectation {
    ShouldBeRequired,
    ShouldBeOptional,
    /// Attributes carry no Required/Optional marker
    ShouldBeComputed,
}

/// Kind of a discrepancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    NoDocument,
    CircularReference {
        block: String,
    },
    FormatError {
        error: FormatError,
    },
    MissingInDoc,
    MissingInCode,
    BlockNotDeclared,
    Requiredness {
        expected: RequirednessExpectation,
    },
    Default {
        /// `None`: the field should state no default
        expected: Option<String>,
        actual: Option<String>,
    },
    ForceNew {
        expected: bool,
    },
    PossibleValues {
        missing: Vec<String>,
        spare: Vec<String>,
        /// Every value the schema accepts, in schema order
        expected: Vec<String>,
    },
    Timeout {
        op: TimeoutOp,
        expected_seconds: u64,
        actual_seconds: Option<u64>,
    },
    Misspelling {
        wrong: String,
        correct: String,
    },
    WrongNesting {
        correct_path: String,
    },
}

impl DiagnosticKind {
    /// Stable snake_case name, as used in suppression entries
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::NoDocument => "no_document",
            DiagnosticKind::CircularReference { .. } => "circular_reference",
            DiagnosticKind::FormatError { .. } => "format_error",
            DiagnosticKind::MissingInDoc => "missing_in_doc",
            DiagnosticKind::MissingInCode => "missing_in_code",
            DiagnosticKind::BlockNotDeclared => "block_not_declared",
            DiagnosticKind::Requiredness { .. } => "requiredness",
            DiagnosticKind::Default { .. } => "default",
            DiagnosticKind::ForceNew { .. } => "force_new",
            DiagnosticKind::PossibleValues { .. } => "possible_values",
            DiagnosticKind::Timeout { .. } => "timeout",
            DiagnosticKind::Misspelling { .. } => "misspelling",
            DiagnosticKind::WrongNesting { .. } => "wrong_nesting",
        }
    }

    /// Whether the fixer can resolve this kind mechanically
    pub fn is_fixable(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::Requiredness { .. }
                | DiagnosticKind::Default { .. }
                | DiagnosticKind::ForceNew { .. }
                | DiagnosticKind::PossibleValues { .. }
                | DiagnosticKind::Timeout { .. }
                | DiagnosticKind::Misspelling { .. }
        )
    }
}

/// One discrepancy found in a resource document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub resource_type: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    /// Dot path of the field, empty for document-level findings
    pub path: String,
    /// 1-based line; `None` means the content is absent and has to be added
    pub line: Option<usize>,
    /// Visible, but excluded from pass/fail and from fixing
    pub skip: bool,
}

impl Diagnostic {
    pub fn new(
        resource_type: impl Into<String>,
        kind: DiagnosticKind,
        path: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            kind,
            path: path.into(),
            line,
            skip: false,
        }
    }

    pub fn skipped(mut self, skip: bool) -> Self {
        self.skip = self.skip || skip;
        self
    }

    /// Last segment of the path
    pub fn field_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.path;
        match &self.kind {
            DiagnosticKind::NoDocument => write!(f, "no documentation found"),
            DiagnosticKind::CircularReference { block } => {
                write!(f, "block `{block}` contains itself at `{path}`")
            }
            DiagnosticKind::FormatError { error } => write!(f, "`{path}`: {error}"),
            DiagnosticKind::MissingInDoc => write!(f, "`{path}` is missing in the documentation"),
            DiagnosticKind::MissingInCode => {
                write!(f, "`{path}` is documented but does not exist in the schema")
            }
            DiagnosticKind::BlockNotDeclared => {
                write!(f, "block `{path}` has no field list in the documentation")
            }
            DiagnosticKind::Requiredness { expected } => match expected {
                RequirednessExpectation::ShouldBeRequired => {
                    write!(f, "`{path}` should be marked Required")
                }
                RequirednessExpectation::ShouldBeOptional => {
                    write!(f, "`{path}` should be marked Optional")
                }
                RequirednessExpectation::ShouldBeComputed => {
                    write!(f, "attribute `{path}` should not be marked Required or Optional")
                }
            },
            DiagnosticKind::Default { expected, actual } => match (expected, actual) {
                (Some(expected), Some(actual)) => write!(
                    f,
                    "default of `{path}` should be `{expected}`, documented as `{actual}`"
                ),
                (Some(expected), None) => {
                    write!(f, "default of `{path}` should be documented as `{expected}`")
                }
                (None, Some(actual)) => {
                    write!(f, "`{path}` should have no default, documented as `{actual}`")
                }
                (None, None) => write!(f, "`{path}` should have no default"),
            },
            DiagnosticKind::ForceNew { expected: true } => {
                write!(f, "changing `{path}` should be documented to force a new resource")
            }
            DiagnosticKind::ForceNew { expected: false } => {
                write!(f, "`{path}` should not be documented to force a new resource")
            }
            DiagnosticKind::PossibleValues { missing, spare, .. } => {
                write!(f, "possible values of `{path}` differ")?;
                if !missing.is_empty() {
                    write!(f, "; missing: {}", quote_all(missing))?;
                }
                if !spare.is_empty() {
                    write!(f, "; not in schema: {}", quote_all(spare))?;
                }
                Ok(())
            }
            DiagnosticKind::Timeout {
                op,
                expected_seconds,
                actual_seconds,
            } => {
                let expected = format_duration(*expected_seconds);
                match actual_seconds {
                    Some(actual) => write!(
                        f,
                        "{op} timeout should be {expected}, documented as {}",
                        format_duration(*actual)
                    ),
                    None if self.line.is_some() => {
                        write!(f, "{op} timeout should state a default of {expected}")
                    }
                    None => write!(f, "{op} timeout of {expected} is not documented"),
                }
            }
            DiagnosticKind::Misspelling { wrong, correct } => {
                write!(f, "`{wrong}` is a misspelling of `{correct}`")
            }
            DiagnosticKind::WrongNesting { correct_path } => {
                write!(f, "`{path}` should be documented as `{correct_path}`")
            }
        }
    }
}

fn quote_all(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("`{v}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let diag = Diagnostic::new(
            "azurerm_x",
            DiagnosticKind::Timeout {
                op: TimeoutOp::Create,
                expected_seconds: 1800,
                actual_seconds: None,
            },
            "timeouts.create",
            None,
        );
        assert_eq!(diag.to_string(), "create timeout of 30 minutes is not documented");

        let diag = Diagnostic::new(
            "azurerm_x",
            DiagnosticKind::PossibleValues {
                missing: vec!["Premium".into()],
                spare: vec![],
                expected: vec!["Basic".into(), "Premium".into()],
            },
            "sku",
            Some(4),
        );
        assert_eq!(diag.to_string(), "possible values of `sku` differ; missing: `Premium`");
        assert_eq!(diag.kind.name(), "possible_values");
        assert!(diag.kind.is_fixable());
    }

    #[test]
    fn test_serialized_shape() {
        let diag = Diagnostic::new("azurerm_x", DiagnosticKind::MissingInDoc, "a.b", None)
            .skipped(true);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "missing_in_doc");
        assert_eq!(json["path"], "a.b");
        assert_eq!(json["skip"], true);
        assert_eq!(diag.field_name(), "b");
    }
}
