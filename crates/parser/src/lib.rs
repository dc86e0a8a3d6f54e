//! Markdown parsing for provider resource documentation
//!
//! This crate turns a resource reference page into a [`ResourceDoc`]: the
//! documented arguments and attributes (with nested blocks resolved), the
//! documented timeouts and a few section landmarks the fixer needs.
//!
//! ## Parsing Strategy
//!
//! Parsing runs in three stages:
//! - the tokenizer groups lines into typed items (headings, field bullets,
//!   block introductions, fenced examples, ...)
//! - the extractors read field bullets and block introductions with the
//!   phrase patterns documentation authors actually use
//! - the builder sorts items into sections and blocks, then resolves every
//!   block-typed field to its block
//!
//! Structural problems are recorded on the model, never returned as errors.

mod block;
mod builder;
mod field;
mod model;
pub mod patterns;
mod properties;
mod tokenizer;

pub use block::Block;
pub use builder::DocumentBuilder;
pub use field::{
    extract_default, extract_forces_replacement, extract_possible_values, extract_requiredness,
    normalize_default, Field, FieldKind, FormatError, PossibleValues, TwinLink,
    EMPTY_STRING_DEFAULT,
};
pub use model::{CircularReference, DocTimeouts, ResourceDoc, TimeoutEntry};
pub use properties::Properties;
pub use tokenizer::{tokenize, LineItem, LineKind};

use tracing::debug;

/// Split document text into lines ready for tokenizing
///
/// Non-breaking spaces become ordinary spaces and a trailing `\r` is
/// dropped, so CRLF and LF documents parse the same.
pub fn normalize_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).replace('\u{a0}', " "))
        .collect();
    // A terminating newline does not start another line
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Parse a resource document
///
/// # Arguments
/// * `resource_type` - Resource the document describes (e.g., "azurerm_redis_cache")
/// * `text` - Raw markdown content
///
/// # Examples
/// ```
/// use provider_doc_lint_parser::parse_document;
///
/// let doc = parse_document(
///     "azurerm_example",
///     "## Arguments Reference\n\n* `name` - (Required) The name.\n",
/// );
/// assert!(doc.args.contains("name"));
/// assert_eq!(doc.line_count, 3);
/// ```
pub fn parse_document(resource_type: &str, text: &str) -> ResourceDoc {
    let lines = normalize_lines(text);
    let items = tokenize(&lines);
    debug!(resource = resource_type, items = items.len(), "Tokenized document");

    let mut doc = DocumentBuilder::new(resource_type).build(&items);
    doc.line_count = lines.len();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lines() {
        let lines = normalize_lines("a\u{a0}b\r\nc\r\n");
        assert_eq!(lines, vec!["a b".to_string(), "c".to_string()]);

        let lines = normalize_lines("a\n\nb");
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_crlf_and_lf_parse_alike() {
        let lf = "## Arguments Reference\n\n* `name` - (Required) The\nname.\n";
        let crlf = lf.replace('\n', "\r\n");
        assert_eq!(parse_document("azurerm_x", lf), parse_document("azurerm_x", &crlf));
    }
}
