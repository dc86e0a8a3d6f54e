//! Field extraction from field-bullet line items

use crate::patterns::{
    BACKTICK_TOKEN, BLOCK_REFERENCE, DEFAULT_VALUE, FIELD_BULLET, FORCE_NEW, OPTIONAL_MARKER,
    OPTIONAL_WORD, POSSIBLE_VALUES, REQUIRED_MARKER, REQUIRED_WORD,
};
use crate::properties::Properties;
use crate::tokenizer::LineItem;
use provider_doc_lint_common::{Requiredness, Section};
use regex::Match;
use serde::Serialize;
use std::fmt;

/// Literal marker for an empty-string default
pub const EMPTY_STRING_DEFAULT: &str = "\"\"";

/// Whether a documented field is a plain attribute or refers to a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Attribute,
    Block,
}

/// Structural problem found while reading a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatError {
    MalformedBullet,
    DuplicateField { line: usize },
    DuplicateBlock { alias: String },
    BlockNotDefined { alias: String },
    MisspelledBlockRef { declared: String, expected: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MalformedBullet => write!(f, "no field name found"),
            FormatError::DuplicateField { line } => {
                write!(f, "field is documented again at line {line}")
            }
            FormatError::DuplicateBlock { alias } => write!(f, "duplicate block `{alias}`"),
            FormatError::BlockNotDefined { alias } => {
                write!(f, "block `{alias}` is not defined in the documentation")
            }
            FormatError::MisspelledBlockRef { declared, expected } => write!(
                f,
                "block reference `{declared}` is a misspelling of `{expected}`"
            ),
        }
    }
}

/// Location of the same-named field in the sibling section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TwinLink {
    pub section: Section,
    pub line: usize,
}

/// A documented field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    /// Dot-joined ancestry of block names
    pub path: String,
    pub requiredness: Requiredness,
    pub line: usize,
    pub end_line: usize,
    pub section: Section,
    pub kind: FieldKind,
    /// `None` means no default is stated
    pub default: Option<String>,
    pub forces_replacement: bool,
    /// Values following a "possible values" phrase
    pub possible_values: Vec<String>,
    /// Backtick tokens of a bullet without a "possible values" phrase
    pub guessed_values: Vec<String>,
    /// Two "possible values" clauses, values cannot be split reliably
    pub ambiguous_values: bool,
    pub block_type_name: Option<String>,
    /// Resolved block content; `None` for attributes and unresolved blocks
    pub sub_fields: Option<Properties>,
    pub twin: Option<TwinLink>,
    pub format_error: Option<FormatError>,
    /// Joined bullet text
    pub content: String,
}

impl Field {
    /// Extract a field from a field-bullet item
    ///
    /// Returns `None` when the bullet carries no backtick-quoted token at all.
    pub fn from_item(item: &LineItem, section: Section) -> Option<Self> {
        let content = item.content();

        let (name, rest, format_error) = match FIELD_BULLET.captures(&content) {
            Some(caps) => (
                caps[1].trim().to_string(),
                caps.get(2).map_or("", |m| m.as_str()).to_string(),
                None,
            ),
            None => {
                let token = BACKTICK_TOKEN.captures(&content)?;
                let name = token[1].trim().to_string();
                let rest = content[token.get(0)?.end()..].to_string();
                (name, rest, Some(FormatError::MalformedBullet))
            }
        };

        if name.is_empty() {
            return None;
        }

        let mut field = Field {
            path: name.clone(),
            name,
            line: item.from_line,
            end_line: item.to_line,
            section,
            requiredness: extract_requiredness(&rest),
            default: extract_default(&rest),
            forces_replacement: extract_forces_replacement(&rest),
            format_error,
            content,
            ..Default::default()
        };

        match extract_possible_values(&rest) {
            PossibleValues::Declared { values, ambiguous } => {
                field.possible_values = values;
                field.ambiguous_values = ambiguous;
            }
            PossibleValues::Guessed(values) => field.guessed_values = values,
            PossibleValues::None => {}
        }

        if let Some(caps) = BLOCK_REFERENCE.captures(&rest) {
            field.kind = FieldKind::Block;
            field.block_type_name = Some(
                caps.get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_else(|| field.name.clone()),
            );
        }

        Some(field)
    }

    pub fn is_block(&self) -> bool {
        self.kind == FieldKind::Block
    }

    /// Values to compare against the schema: declared ones, else guessed ones
    pub fn documented_values(&self) -> (&[String], bool) {
        if self.possible_values.is_empty() {
            (&self.guessed_values, true)
        } else {
            (&self.possible_values, false)
        }
    }
}

/// Requiredness from literal markers first, then bare words
pub fn extract_requiredness(text: &str) -> Requiredness {
    earliest(REQUIRED_MARKER.find(text), OPTIONAL_MARKER.find(text))
        .or_else(|| earliest(REQUIRED_WORD.find(text), OPTIONAL_WORD.find(text)))
        .unwrap_or_default()
}

fn earliest(required: Option<Match<'_>>, optional: Option<Match<'_>>) -> Option<Requiredness> {
    match (required, optional) {
        (Some(r), Some(o)) if o.start() < r.start() => Some(Requiredness::Optional),
        (Some(_), _) => Some(Requiredness::Required),
        (None, Some(_)) => Some(Requiredness::Optional),
        (None, None) => None,
    }
}

/// First stated default, with the empty string rendered as `""`
pub fn extract_default(text: &str) -> Option<String> {
    let caps = DEFAULT_VALUE.captures(text)?;
    Some(normalize_default(strip_quote(&caps[1])))
}

/// Normalize a default value for comparison
pub fn normalize_default(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == EMPTY_STRING_DEFAULT || value == "''" {
        return EMPTY_STRING_DEFAULT.to_string();
    }
    let unquoted = strip_quote(value);
    if unquoted.is_empty() {
        EMPTY_STRING_DEFAULT.to_string()
    } else {
        unquoted.to_string()
    }
}

/// Remove one pair of surrounding quote characters
fn strip_quote(value: &str) -> &str {
    for quote in ['`', '"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            let inner = &value[1..value.len() - 1];
            // `""` stays the empty-string marker
            if quote == '`' || !inner.is_empty() {
                return inner;
            }
        }
    }
    value
}

/// Unconditional "Changing this forces a new resource to be created"
pub fn extract_forces_replacement(text: &str) -> bool {
    FORCE_NEW
        .captures_iter(text)
        .any(|caps| caps.get(1).is_none())
}

/// Result of enumerated value extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PossibleValues {
    None,
    Declared { values: Vec<String>, ambiguous: bool },
    Guessed(Vec<String>),
}

/// Collect backtick tokens after a "possible values" phrase up to the next
/// bare period
pub fn extract_possible_values(text: &str) -> PossibleValues {
    let mut markers = POSSIBLE_VALUES.find_iter(text);
    let Some(marker) = markers.next() else {
        let guessed = dedup(BACKTICK_TOKEN.captures_iter(text).map(|c| clean_value(&c[1])));
        return if guessed.is_empty() {
            PossibleValues::None
        } else {
            PossibleValues::Guessed(guessed)
        };
    };
    let ambiguous = markers.next().is_some();

    let clause = &text[marker.end()..];
    let mut values = Vec::new();
    let mut in_token = false;
    let mut token = String::new();
    let mut chars = clause.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' if in_token => {
                values.push(clean_value(&token));
                token.clear();
                in_token = false;
            }
            '`' => in_token = true,
            '.' if !in_token && chars.peek().map_or(true, |n| n.is_whitespace()) => break,
            _ if in_token => token.push(c),
            _ => {}
        }
    }

    PossibleValues::Declared {
        values: dedup(values.into_iter()),
        ambiguous,
    }
}

fn clean_value(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
