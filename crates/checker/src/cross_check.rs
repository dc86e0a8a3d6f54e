//! Structural diff between a parsed document and a resource schema

use crate::diagnostic::{Diagnostic, DiagnosticKind, RequirednessExpectation};
use crate::fuzzy::merge_misspellings;
use crate::upgrade_guide::UpgradeGuide;
use provider_doc_lint_common::{LintConfig, Requiredness, ID_FIELD};
use provider_doc_lint_parser::{Field, FormatError, Properties, ResourceDoc};
use provider_doc_lint_schema::{ResourceSchema, SchemaField, SchemaFields};
use tracing::debug;

/// Path prefix of timeout diagnostics
pub const TIMEOUTS_PATH: &str = "timeouts";

/// Compares one document against its schema
pub struct CrossChecker<'a> {
    config: &'a LintConfig,
    upgrade_guide: Option<&'a UpgradeGuide>,
}

/// The documented occurrences of one name at one nesting level
#[derive(Clone, Copy)]
struct Occurrences<'d> {
    arg: Option<&'d Field>,
    attr: Option<&'d Field>,
}

impl<'d> Occurrences<'d> {
    /// Arguments occurrence first
    fn primary(&self) -> Option<&'d Field> {
        self.arg.or(self.attr)
    }

    fn is_empty(&self) -> bool {
        self.arg.is_none() && self.attr.is_none()
    }
}

impl<'a> CrossChecker<'a> {
    pub fn new(config: &'a LintConfig) -> Self {
        Self {
            config,
            upgrade_guide: None,
        }
    }

    pub fn with_upgrade_guide(mut self, guide: Option<&'a UpgradeGuide>) -> Self {
        self.upgrade_guide = guide;
        self
    }

    /// Diff `doc` against `schema`
    ///
    /// Misspellings are merged and configured exclusions and suppressions
    /// applied before the diagnostics are returned, ordered by line.
    pub fn check(&self, doc: &ResourceDoc, schema: &ResourceSchema) -> Vec<Diagnostic> {
        let resource_type = schema.resource_type.as_str();

        if let Some(circular) = &doc.circular_reference {
            let diagnostic = Diagnostic::new(
                resource_type,
                DiagnosticKind::CircularReference {
                    block: circular.block.clone(),
                },
                circular.path.clone(),
                Some(circular.line),
            );
            return self.apply_config(vec![diagnostic]);
        }

        let mut run = Run {
            checker: self,
            resource_type,
            out: Vec::new(),
        };
        run.check_level(Some(&doc.args), Some(&doc.attrs), &schema.fields, None);
        run.check_timeouts(doc, schema);

        let diagnostics = run.out;
        debug!(
            resource = resource_type,
            count = diagnostics.len(),
            "Cross-checked document"
        );

        let mut diagnostics = self.apply_config(merge_misspellings(diagnostics));
        diagnostics.sort_by_key(|d| d.line.unwrap_or(usize::MAX));
        diagnostics
    }

    /// Drop excluded fields and mark suppressed diagnostics
    fn apply_config(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter(|d| d.path.is_empty() || !self.config.excludes_field(&d.resource_type, &d.path))
            .map(|d| {
                let path = (!d.path.is_empty()).then_some(d.path.as_str());
                let suppressed = self
                    .config
                    .is_suppressed(&d.resource_type, path, d.kind.name());
                d.skipped(suppressed)
            })
            .collect()
    }
}

/// State of one check
struct Run<'c, 'a> {
    checker: &'c CrossChecker<'a>,
    resource_type: &'c str,
    out: Vec<Diagnostic>,
}

impl Run<'_, '_> {
    fn emit(&mut self, kind: DiagnosticKind, path: &str, line: Option<usize>) -> &mut Diagnostic {
        self.out
            .push(Diagnostic::new(self.resource_type, kind, path, line));
        let last = self.out.len() - 1;
        &mut self.out[last]
    }

    fn check_level(
        &mut self,
        args: Option<&Properties>,
        attrs: Option<&Properties>,
        schema: &SchemaFields,
        parent: Option<&str>,
    ) {
        for (name, field) in schema {
            let path = join(parent, name);
            let found = Occurrences {
                arg: args.and_then(|p| p.get(name)),
                attr: attrs.and_then(|p| p.get(name)),
            };

            if found.is_empty() {
                if !field.computed && !field.deprecated && name != ID_FIELD {
                    self.emit(DiagnosticKind::MissingInDoc, &path, None);
                }
                continue;
            }

            self.check_requiredness(field, found, &path);
            self.check_default(field, found, &path);
            self.check_force_new(field, found, &path);
            self.check_possible_values(field, found, &path);

            if let Some(sub_schema) = field.block() {
                let arg_subs = found.arg.and_then(|f| f.sub_fields.as_ref());
                let attr_subs = found.attr.and_then(|f| f.sub_fields.as_ref());
                if arg_subs.is_none() && attr_subs.is_none() {
                    let line = found.primary().map(|f| f.line);
                    self.emit(DiagnosticKind::BlockNotDeclared, &path, line);
                } else {
                    self.check_level(arg_subs, attr_subs, sub_schema, Some(&path));
                }
            }
        }

        if let Some(args) = args {
            self.check_documented(args, attrs, schema, parent, false);
        }
        if let Some(attrs) = attrs {
            self.check_documented(attrs, args, schema, parent, true);
        }
    }

    /// Report documented fields the schema does not know, and format errors
    fn check_documented(
        &mut self,
        props: &Properties,
        twins: Option<&Properties>,
        schema: &SchemaFields,
        parent: Option<&str>,
        is_attr: bool,
    ) {
        for doc_field in props.fields() {
            let path = join(parent, &doc_field.name);
            let schema_field = schema.get(&doc_field.name);
            let twin = twins.and_then(|t| t.get(&doc_field.name));

            if let Some(error) = &doc_field.format_error {
                match error {
                    FormatError::MisspelledBlockRef { declared, expected } => {
                        self.emit(
                            DiagnosticKind::Misspelling {
                                wrong: declared.clone(),
                                correct: expected.clone(),
                            },
                            &path,
                            Some(doc_field.line),
                        );
                    }
                    // Reported as BlockNotDeclared unless the twin resolved
                    FormatError::BlockNotDefined { .. }
                        if schema_field.is_some_and(SchemaField::is_block)
                            && twin.map_or(true, |t| t.sub_fields.is_none()) => {}
                    error => {
                        self.emit(
                            DiagnosticKind::FormatError {
                                error: error.clone(),
                            },
                            &path,
                            Some(doc_field.line),
                        );
                    }
                }
                continue;
            }

            match schema_field {
                None if doc_field.name == ID_FIELD => {}
                // Counted once, on the Arguments occurrence
                None if is_attr && twin.is_some() => {}
                None => {
                    self.emit(DiagnosticKind::MissingInCode, &path, Some(doc_field.line));
                }
                Some(field) if !field.is_block() => {
                    let first_sub = doc_field
                        .sub_fields
                        .as_ref()
                        .and_then(|subs| subs.fields().min_by_key(|f| f.line));
                    if let Some(sub) = first_sub {
                        let sub_path = join(Some(&path), &sub.name);
                        self.emit(DiagnosticKind::MissingInCode, &sub_path, Some(sub.line));
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn check_requiredness(&mut self, field: &SchemaField, found: Occurrences<'_>, path: &str) {
        if field.required {
            if let Some(doc) = found.primary() {
                if doc.requiredness != Requiredness::Required {
                    self.emit(
                        DiagnosticKind::Requiredness {
                            expected: RequirednessExpectation::ShouldBeRequired,
                        },
                        path,
                        Some(doc.line),
                    );
                }
            }
            return;
        }

        if field.optional {
            if let Some(arg) = found.arg {
                if matches!(
                    arg.requiredness,
                    Requiredness::Required | Requiredness::Unspecified
                ) {
                    self.emit(
                        DiagnosticKind::Requiredness {
                            expected: RequirednessExpectation::ShouldBeOptional,
                        },
                        path,
                        Some(arg.line),
                    );
                }
            }
        }

        if field.computed {
            if let Some(attr) = found.attr {
                if attr.requiredness.is_marked() {
                    self.emit(
                        DiagnosticKind::Requiredness {
                            expected: RequirednessExpectation::ShouldBeComputed,
                        },
                        path,
                        Some(attr.line),
                    );
                }
            }
        }
    }

    fn check_default(&mut self, field: &SchemaField, found: Occurrences<'_>, path: &str) {
        let Some(doc) = found.primary() else {
            return;
        };
        let actual = doc.default.as_deref();

        let mismatch = match (&field.default, actual) {
            (Some(expected), None) if expected.is_false() => None,
            (Some(expected), Some(actual)) if expected.is_false() => {
                (actual != "false").then(|| Some(expected.render()))
            }
            (Some(expected), None) => Some(Some(expected.render())),
            (Some(expected), Some(actual)) => {
                (!expected.matches(actual)).then(|| Some(expected.render()))
            }
            (None, Some(actual)) if !field.computed && actual != "false" => Some(None),
            (None, _) => None,
        };

        if let Some(expected) = mismatch {
            self.emit(
                DiagnosticKind::Default {
                    expected,
                    actual: actual.map(String::from),
                },
                path,
                Some(doc.line),
            );
        }
    }

    fn check_force_new(&mut self, field: &SchemaField, found: Occurrences<'_>, path: &str) {
        if self.checker.config.is_force_new_exempt(&field.name) {
            return;
        }
        let Some(doc) = found.primary() else {
            return;
        };
        if doc.forces_replacement != field.force_new {
            self.emit(
                DiagnosticKind::ForceNew {
                    expected: field.force_new,
                },
                path,
                Some(doc.line),
            );
        }
    }

    fn check_possible_values(&mut self, field: &SchemaField, found: Occurrences<'_>, path: &str) {
        if field.possible_values.is_empty() {
            return;
        }
        // Prefer the occurrence that actually lists values
        let Some(doc) = [found.arg, found.attr]
            .into_iter()
            .flatten()
            .find(|f| !f.possible_values.is_empty())
            .or_else(|| found.primary())
        else {
            return;
        };

        let (documented, guessed) = doc.documented_values();
        let missing: Vec<String> = field
            .possible_values
            .iter()
            .filter(|v| !contains_ignore_case(documented, v))
            .cloned()
            .collect();
        let spare: Vec<String> = if guessed {
            Vec::new()
        } else {
            documented
                .iter()
                .filter(|v| !contains_ignore_case(&field.possible_values, v))
                .cloned()
                .collect()
        };

        if missing.is_empty() && spare.is_empty() {
            return;
        }
        if field
            .possible_values
            .iter()
            .all(|value| doc.content.contains(value.as_str()))
        {
            return;
        }
        if let Some(guide) = self.checker.upgrade_guide {
            if guide.documents_change(self.resource_type, &field.name) {
                debug!(path, "Possible values change documented in upgrade guide");
                return;
            }
        }

        // Values guessed from prose are never authoritative
        let skip = doc.ambiguous_values || (guessed && !doc.guessed_values.is_empty());
        self.emit(
            DiagnosticKind::PossibleValues {
                missing,
                spare,
                expected: field.possible_values.clone(),
            },
            path,
            Some(doc.line),
        )
        .skip = skip;
    }

    fn check_timeouts(&mut self, doc: &ResourceDoc, schema: &ResourceSchema) {
        for (op, expected) in schema.timeouts.declared() {
            let path = format!("{TIMEOUTS_PATH}.{op}");
            match doc.timeouts.get(op) {
                None => {
                    self.emit(
                        DiagnosticKind::Timeout {
                            op,
                            expected_seconds: expected,
                            actual_seconds: None,
                        },
                        &path,
                        None,
                    );
                }
                Some(entry) if entry.seconds != Some(expected) => {
                    self.emit(
                        DiagnosticKind::Timeout {
                            op,
                            expected_seconds: expected,
                            actual_seconds: entry.seconds,
                        },
                        &path,
                        Some(entry.line),
                    );
                }
                Some(_) => {}
            }
        }
    }
}

fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

fn contains_ignore_case(values: &[String], value: &str) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(value))
}
