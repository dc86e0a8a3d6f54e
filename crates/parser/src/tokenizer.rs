//! Markdown tokenizer
//!
//! Splits document lines into typed line items. Multi-line items accumulate
//! consecutive lines of a compatible kind (wrapped field bullets, fenced
//! examples, the metadata block, plain paragraphs).

use crate::patterns::{BLOCK_INTRO, BLOCK_INTRO_TAIL};
use provider_doc_lint_common::Section;
use serde::Serialize;

/// Kind of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Metadata,
    Heading(u8),
    Example,
    FieldBullet,
    BlockIntro,
    Note,
    Separator,
    PlainText,
    TimeoutBullet,
}

/// One or more consecutive document lines of the same kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// First line, 1-based
    pub from_line: usize,
    /// Last line, 1-based, inclusive
    pub to_line: usize,
    pub lines: Vec<String>,
    pub kind: LineKind,
}

impl LineItem {
    fn new(kind: LineKind, line_no: usize, line: &str) -> Self {
        Self {
            from_line: line_no,
            to_line: line_no,
            lines: vec![line.to_string()],
            kind,
        }
    }

    fn push(&mut self, line_no: usize, line: &str) {
        self.to_line = line_no;
        self.lines.push(line.to_string());
    }

    /// Lines joined into one logical line
    pub fn content(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Heading text without the leading hashes
    pub fn heading_text(&self) -> Option<&str> {
        match self.kind {
            LineKind::Heading(_) => self
                .lines
                .first()
                .map(|l| l.trim().trim_start_matches('#').trim()),
            _ => None,
        }
    }
}

/// Tokenize normalized document lines
///
/// # Examples
/// ```
/// use provider_doc_lint_parser::{tokenize, LineKind};
///
/// let lines: Vec<String> = ["## Arguments Reference", "", "* `name` - (Required) The name."]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let items = tokenize(&lines);
/// assert_eq!(items[0].kind, LineKind::Heading(2));
/// assert_eq!(items[1].kind, LineKind::FieldBullet);
/// assert_eq!(items[1].from_line, 3);
/// ```
pub fn tokenize(lines: &[String]) -> Vec<LineItem> {
    let mut tokenizer = Tokenizer::default();
    for (idx, line) in lines.iter().enumerate() {
        tokenizer.feed(idx + 1, line);
    }
    tokenizer.items
}

#[derive(Default)]
struct Tokenizer {
    items: Vec<LineItem>,
    /// Whether the last item still accepts continuation lines
    open: bool,
    in_fence: bool,
    in_metadata: bool,
    in_timeouts: bool,
}

impl Tokenizer {
    fn feed(&mut self, line_no: usize, line: &str) {
        let trimmed = line.trim();

        if self.in_fence {
            self.append(line_no, line);
            if trimmed.starts_with("```") {
                self.in_fence = false;
                self.open = false;
            }
            return;
        }

        // An empty line also ends unterminated front matter
        if self.in_metadata && trimmed.is_empty() {
            self.in_metadata = false;
            self.open = false;
        }

        if self.in_metadata {
            self.append(line_no, line);
            if is_separator(trimmed) {
                self.in_metadata = false;
                self.open = false;
            }
            return;
        }

        if trimmed.starts_with("```") {
            self.start(LineKind::Example, line_no, line, true);
            self.in_fence = true;
            return;
        }

        if let Some(level) = heading_level(trimmed) {
            if level <= 2 {
                self.in_timeouts = Section::from_heading(trimmed) == Section::Timeout;
            }
            self.start(LineKind::Heading(level), line_no, line, false);
            return;
        }

        if is_separator(trimmed) {
            if line_no == 1 {
                self.start(LineKind::Metadata, line_no, line, true);
                self.in_metadata = true;
            } else {
                self.start(LineKind::Separator, line_no, line, false);
            }
            return;
        }

        if trimmed.is_empty() {
            self.open = false;
            return;
        }

        if trimmed.starts_with("->") || trimmed.starts_with("~>") {
            self.start(LineKind::Note, line_no, line, false);
            return;
        }

        if is_block_intro(trimmed) {
            self.start(LineKind::BlockIntro, line_no, line, false);
            return;
        }

        if trimmed.starts_with('*') && !trimmed.starts_with("**") {
            let kind = if self.in_timeouts {
                LineKind::TimeoutBullet
            } else {
                LineKind::FieldBullet
            };
            self.start(kind, line_no, line, true);
            return;
        }

        if self.accepts_continuation(line) {
            self.append(line_no, line);
            return;
        }

        self.start(LineKind::PlainText, line_no, line, true);
    }

    fn accepts_continuation(&self, line: &str) -> bool {
        if !self.open {
            return false;
        }
        let Some(current) = self.items.last() else {
            return false;
        };

        match current.kind {
            LineKind::PlainText => true,
            LineKind::FieldBullet | LineKind::TimeoutBullet => {
                let previous_terminated = current
                    .lines
                    .last()
                    .is_some_and(|l| l.trim_end().ends_with('.'));
                let continues = line.starts_with(|c: char| {
                    c.is_alphanumeric() || c.is_whitespace() || matches!(c, '`' | '(' | '"' | '\'')
                });
                !previous_terminated && continues
            }
            _ => false,
        }
    }

    fn start(&mut self, kind: LineKind, line_no: usize, line: &str, open: bool) {
        self.items.push(LineItem::new(kind, line_no, line));
        self.open = open;
    }

    fn append(&mut self, line_no: usize, line: &str) {
        match self.items.last_mut() {
            Some(item) => item.push(line_no, line),
            None => self.items.push(LineItem::new(LineKind::PlainText, line_no, line)),
        }
    }
}

fn heading_level(trimmed: &str) -> Option<u8> {
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some(hashes.min(3) as u8)
}

fn is_separator(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn is_block_intro(trimmed: &str) -> bool {
    BLOCK_INTRO
        .captures(trimmed)
        .and_then(|caps| caps.get(2))
        .is_some_and(|tail| BLOCK_INTRO_TAIL.is_match(tail.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn kinds(items: &[LineItem]) -> Vec<LineKind> {
        items.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_metadata_block() {
        let items = tokenize(&lines("---\nsubcategory: \"Redis\"\n---\n\n# azurerm_redis_cache"));
        assert_eq!(kinds(&items), vec![LineKind::Metadata, LineKind::Heading(1)]);
        assert_eq!(items[0].from_line, 1);
        assert_eq!(items[0].to_line, 3);
    }

    #[test]
    fn test_unterminated_metadata_ends_at_blank_line() {
        let items = tokenize(&lines(
            "---\nsubcategory: x\n\n## Arguments Reference\n\n* `name` - (Required) The name.",
        ));
        assert_eq!(
            kinds(&items),
            vec![LineKind::Metadata, LineKind::Heading(2), LineKind::FieldBullet]
        );
        assert_eq!(items[0].to_line, 2);
        assert_eq!(items[2].from_line, 6);
    }

    #[test]
    fn test_separator_after_first_line() {
        let items = tokenize(&lines("# title\n\n---\n"));
        assert_eq!(kinds(&items), vec![LineKind::Heading(1), LineKind::Separator]);
    }

    #[test]
    fn test_fenced_example_keeps_blank_lines() {
        let items = tokenize(&lines(
            "```hcl\nresource \"x\" \"y\" {\n\n  # comment\n  * not a bullet\n}\n```\ntext",
        ));
        assert_eq!(kinds(&items), vec![LineKind::Example, LineKind::PlainText]);
        assert_eq!(items[0].lines.len(), 7);
        assert_eq!(items[0].lines[2], "");
    }

    #[test]
    fn test_field_bullet_continuation() {
        let items = tokenize(&lines(
            "* `name` - (Required) The name of the\nresource. Changing this forces a new resource to be created.\n* `sku` - (Optional) The SKU.",
        ));
        assert_eq!(kinds(&items), vec![LineKind::FieldBullet, LineKind::FieldBullet]);
        assert_eq!(items[0].to_line, 2);
        assert!(items[0].content().contains("forces a new resource"));
    }

    #[test]
    fn test_terminated_bullet_does_not_continue() {
        let items = tokenize(&lines("* `name` - (Required) The name.\nMore prose here."));
        assert_eq!(kinds(&items), vec![LineKind::FieldBullet, LineKind::PlainText]);
    }

    #[test]
    fn test_bold_text_is_not_a_bullet() {
        let items = tokenize(&lines("**Note:** something"));
        assert_eq!(kinds(&items), vec![LineKind::PlainText]);
    }

    #[test]
    fn test_notes_and_block_intro() {
        let items = tokenize(&lines(
            "-> **NOTE:** a note\n\n~> **NOTE:** a warning\n\nA `identity` block supports the following:",
        ));
        assert_eq!(
            kinds(&items),
            vec![LineKind::Note, LineKind::Note, LineKind::BlockIntro]
        );
    }

    #[test]
    fn test_timeout_bullets() {
        let items = tokenize(&lines(
            "## Timeouts\n\n* `create` - (Defaults to 30 minutes) Used when creating.\n\n## Import\n\n* `x` - y",
        ));
        assert_eq!(
            kinds(&items),
            vec![
                LineKind::Heading(2),
                LineKind::TimeoutBullet,
                LineKind::Heading(2),
                LineKind::FieldBullet
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        let items = tokenize(&lines("# a\n## b\n### c\n#### d\n#hashtag"));
        assert_eq!(
            kinds(&items),
            vec![
                LineKind::Heading(1),
                LineKind::Heading(2),
                LineKind::Heading(3),
                LineKind::Heading(3),
                LineKind::PlainText
            ]
        );
        assert_eq!(items[1].heading_text(), Some("b"));
    }
}
