//! Line patterns shared by the tokenizer and the extractors
//!
//! Compiled once; every pattern here describes a documentation convention,
//! not a formal grammar.

use once_cell::sync::Lazy;
use regex::Regex;

/// `* `name` - rest`
pub static FIELD_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\s*`([^`]+)`\s*[-–—:]\s*(.*)$").unwrap());

/// Any backtick-quoted token
pub static BACKTICK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());

pub static REQUIRED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*Required\s*\)").unwrap());

pub static OPTIONAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*Optional\s*\)").unwrap());

pub static REQUIRED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bRequired\b").unwrap());

pub static OPTIONAL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOptional\b").unwrap());

/// `Defaults to `x``, `the default value is 'x'`, `default is "x"`
pub static DEFAULT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:^|[.,;(]|\s)\s*(?:the\s+)?(?:default\s+value\s+(?:is|to)|defaults?\s+(?:to|is))\s*:?\s*(`[^`]*`|'[^']*'|"[^"]*")[.,]?"#,
    )
    .unwrap()
});

/// `Changing this forces a new resource to be created`, with an optional
/// conditional tail captured in group 1
pub static FORCE_NEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bchanging\b[^.]*?\bforces?\b[^.]*?\bcreated\b(\s+(?:when|if|unless|only)\b)?")
        .unwrap()
});

/// Phrases introducing an enumerated value list
pub static POSSIBLE_VALUES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:possible\s+values?|must\s+be\s+(?:one\s+of|either)|valid\s+values?|accepted\s+values?|allowed\s+values?|supported\s+values?|can\s+be\s+(?:either|one\s+of)|is\s+one\s+of|valid\s+options?\s+(?:are|is)|possible\s+options?\s+(?:are|is))\b",
    )
    .unwrap()
});

/// `A `name` block as defined below` inside a field bullet
pub static BLOCK_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:`([^`]+)`\s+)?blocks?\s+(?:(?:is|are)\s+)?(?:as\s+)?(?:defined|detailed|documented|described|specified)\s+(?:below|above)",
    )
    .unwrap()
});

/// `A `name` (and `other`) block(s) <tail>` at the start of a sentence
pub static BLOCK_INTRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:an?|the|each)\s+)?((?:`[^`]+`\s*(?:,\s*|\band\s+|\bor\s+|/\s*)?)+)\s*blocks?\b(.*)$",
    )
    .unwrap()
});

/// Tail a block introduction must carry
pub static BLOCK_INTRO_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?::\s*$|\bsupports?\b|\bexports?\b|\baccepts?\b|\bcontains?\b|\bfollowing\b)")
        .unwrap()
});

/// `of `parent``, `within the `parent`` in a block introduction
pub static BLOCK_PARENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:of|within|in|under)\s+(?:the\s+|an?\s+)?`([^`]+)`").unwrap()
});

/// `* `create` - (Defaults to 30 minutes) Used when ...`
pub static TIMEOUT_BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\*\s*`(create|read|update|delete)`").unwrap()
});

pub static TIMEOUT_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*defaults?\s+to\s+([^)]+)\)").unwrap());
