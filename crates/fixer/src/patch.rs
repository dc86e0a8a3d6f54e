//! Line patches per diagnostic kind
//!
//! A patch works on the lines of one documented item (a field or timeout
//! bullet, possibly wrapped over several lines) and reports whether it
//! changed anything. Phrases are located with the same patterns the parser
//! reads them with, so a patched bullet parses back to the expected value.

use once_cell::sync::Lazy;
use provider_doc_lint_checker::{DiagnosticKind, RequirednessExpectation};
use provider_doc_lint_common::duration::format_duration;
use provider_doc_lint_parser::patterns::{
    DEFAULT_VALUE, FORCE_NEW, POSSIBLE_VALUES, TIMEOUT_DURATION,
};
use regex::Regex;

/// Sentence stating that a field forces replacement
pub const FORCE_NEW_SENTENCE: &str = "Changing this forces a new resource to be created.";

static REQUIREDNESS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(?:Required|Optional)\s*\)").unwrap());

static REQUIREDNESS_MARKER_SPACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(?:Required|Optional)\s*\)[ \t]*").unwrap());

/// Bare `Optional.` or `Required -` opening a bullet's description
static LEADING_REQUIREDNESS_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*\*\s*`[^`]+`\s*[-–—:]?\s*)(?:Required|Optional)\b\s*[.:,\-–—]?[ \t]+(\S)")
        .unwrap()
});

/// `* `name` - ` up to the description text
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*\s*`[^`]+`\s*[-–—:]?\s*").unwrap());

/// Apply the patch for `kind` to an item's lines
///
/// The last line of a patched item ends in `.` or `?` afterwards.
pub fn apply(kind: &DiagnosticKind, item: &mut [String]) -> bool {
    let changed = match kind {
        DiagnosticKind::Requiredness { expected } => requiredness(item, *expected),
        DiagnosticKind::Default { expected, actual } => {
            default(item, expected.as_deref(), actual.is_some())
        }
        DiagnosticKind::ForceNew { expected } => force_new(item, *expected),
        DiagnosticKind::PossibleValues { expected, .. } => possible_values(item, expected),
        DiagnosticKind::Timeout {
            expected_seconds, ..
        } => timeout(item, *expected_seconds),
        DiagnosticKind::Misspelling { wrong, correct } => rename(item, wrong, correct),
        _ => false,
    };

    if changed {
        if let Some(last) = item.last_mut() {
            end_sentence(last);
        }
    }
    changed
}

fn requiredness(item: &mut [String], expected: RequirednessExpectation) -> bool {
    let marker = match expected {
        RequirednessExpectation::ShouldBeRequired => "(Required)",
        RequirednessExpectation::ShouldBeOptional => "(Optional)",
        RequirednessExpectation::ShouldBeComputed => return remove_markers(item),
    };

    for line in item.iter_mut() {
        let range = REQUIREDNESS_MARKER.find(line).map(|m| m.range());
        if let Some(range) = range {
            line.replace_range(range, marker);
            return true;
        }
    }
    insert_after_prefix(item, &format!("{marker} "))
}

fn remove_markers(item: &mut [String]) -> bool {
    let mut changed = false;
    for line in item.iter_mut() {
        if REQUIREDNESS_MARKER_SPACED.is_match(line) {
            *line = REQUIREDNESS_MARKER_SPACED.replace_all(line, "").into_owned();
            changed = true;
        }
    }
    if changed {
        return true;
    }

    // Only a word opening the description; one inside the prose is left alone
    match item.first_mut() {
        Some(first) if LEADING_REQUIREDNESS_WORD.is_match(first) => {
            *first = LEADING_REQUIREDNESS_WORD
                .replace(first, "${1}${2}")
                .into_owned();
            true
        }
        _ => false,
    }
}

fn default(item: &mut [String], expected: Option<&str>, documented: bool) -> bool {
    match (expected, documented) {
        (Some(expected), true) => {
            for line in item.iter_mut() {
                let range = DEFAULT_VALUE
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.range());
                if let Some(range) = range {
                    line.replace_range(range, &format!("`{expected}`"));
                    return true;
                }
            }
            false
        }
        (Some(expected), false) => append_sentence(item, &format!("Defaults to `{expected}`.")),
        (None, true) => {
            for line in item.iter_mut() {
                // The match starts at the delimiter before the phrase
                let span = DEFAULT_VALUE.find(line).map(|m| {
                    let offset = m.as_str().find(char::is_alphabetic).unwrap_or(0);
                    (m.start() + offset, m.end())
                });
                if let Some((start, end)) = span {
                    remove_span(line, start, end);
                    return true;
                }
            }
            false
        }
        (None, false) => false,
    }
}

fn force_new(item: &mut [String], expected: bool) -> bool {
    if expected {
        return append_sentence(item, FORCE_NEW_SENTENCE);
    }

    for line in item.iter_mut() {
        let span = FORCE_NEW
            .captures_iter(line)
            .find(|caps| caps.get(1).is_none())
            .and_then(|caps| caps.get(0))
            .map(|m| {
                let end = if line[m.end()..].starts_with('.') {
                    m.end() + 1
                } else {
                    m.end()
                };
                (m.start(), end)
            });
        if let Some((start, end)) = span {
            remove_span(line, start, end);
            return true;
        }
    }
    false
}

fn possible_values(item: &mut [String], expected: &[String]) -> bool {
    if expected.is_empty() {
        return false;
    }
    let list = format_values(expected);

    for line in item.iter_mut() {
        let Some(marker_end) = POSSIBLE_VALUES.find(line).map(|m| m.end()) else {
            continue;
        };
        return match value_span(&line[marker_end..]) {
            Some((start, end)) => {
                line.replace_range(marker_end + start..marker_end + end, &list);
                true
            }
            // A clause without quoted values cannot be rewritten reliably
            None => false,
        };
    }
    append_sentence(item, &format!("Possible values are {list}."))
}

fn timeout(item: &mut [String], seconds: u64) -> bool {
    let duration = format_duration(seconds);
    for line in item.iter_mut() {
        let range = TIMEOUT_DURATION
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.range());
        if let Some(range) = range {
            line.replace_range(range, &duration);
            return true;
        }
    }
    insert_after_prefix(item, &format!("(Defaults to {duration}) "))
}

fn rename(item: &mut [String], wrong: &str, correct: &str) -> bool {
    let from = format!("`{wrong}`");
    let to = format!("`{correct}`");
    for line in item.iter_mut() {
        if let Some(pos) = line.find(&from) {
            line.replace_range(pos..pos + from.len(), &to);
            return true;
        }
    }
    false
}

/// `` `a` ``, `` `a` and `b` ``, `` `a`, `b` and `c` ``
pub fn format_values(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("`{v}`")).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

/// Byte span from the first to the last quoted value of a clause, which
/// ends at the first period outside backticks
fn value_span(clause: &str) -> Option<(usize, usize)> {
    let mut in_token = false;
    let mut first = None;
    let mut last = None;
    let mut chars = clause.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '`' if in_token => {
                in_token = false;
                last = Some(i + 1);
            }
            '`' => {
                in_token = true;
                first.get_or_insert(i);
            }
            '.' if !in_token && chars.peek().map_or(true, |(_, n)| n.is_whitespace()) => break,
            _ => {}
        }
    }
    first.zip(last)
}

fn insert_after_prefix(item: &mut [String], text: &str) -> bool {
    let Some(first) = item.first_mut() else {
        return false;
    };
    let Some(end) = BULLET_PREFIX.find(first).map(|m| m.end()) else {
        return false;
    };
    first.insert_str(end, text);
    true
}

fn append_sentence(item: &mut [String], sentence: &str) -> bool {
    let Some(last) = item.last_mut() else {
        return false;
    };
    end_sentence(last);
    last.push(' ');
    last.push_str(sentence);
    true
}

fn end_sentence(line: &mut String) {
    line.truncate(line.trim_end().len());
    if !line.ends_with('.') && !line.ends_with('?') {
        line.push('.');
    }
}

/// Cut `start..end` out of a line and rejoin the remains
fn remove_span(line: &mut String, start: usize, end: usize) {
    let head = line[..start].trim_end();
    let tail = line[end..].trim_start();

    let joined = if tail.is_empty() {
        head.trim_end_matches([',', ';']).to_string()
    } else if head.is_empty() {
        tail.to_string()
    } else if let (Some(head), Some(rest)) = (head.strip_suffix('('), tail.strip_prefix(')')) {
        let head = head.trim_end();
        let rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(['.', ',', ';']) {
            format!("{head}{rest}")
        } else {
            format!("{head} {rest}")
        }
    } else {
        format!("{head} {tail}")
    };
    *line = joined;
}
