//! Parsed resource document

use crate::field::Field;
use crate::properties::Properties;
use provider_doc_lint_common::{Section, TimeoutOp};
use serde::Serialize;

/// A documented timeout bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutEntry {
    pub line: usize,
    /// `None` when the bullet states no readable duration
    pub seconds: Option<u64>,
}

/// Documented timeouts per operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocTimeouts {
    pub create: Option<TimeoutEntry>,
    pub read: Option<TimeoutEntry>,
    pub update: Option<TimeoutEntry>,
    pub delete: Option<TimeoutEntry>,
}

impl DocTimeouts {
    pub fn get(&self, op: TimeoutOp) -> Option<&TimeoutEntry> {
        self.slot(op).as_ref()
    }

    /// Record an entry; the first bullet of an operation wins
    pub fn set(&mut self, op: TimeoutOp, entry: TimeoutEntry) {
        let slot = self.slot_mut(op);
        if slot.is_none() {
            *slot = Some(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        TimeoutOp::ALL.iter().all(|op| self.get(*op).is_none())
    }

    /// Documented entries in canonical order
    pub fn entries(&self) -> impl Iterator<Item = (TimeoutOp, &TimeoutEntry)> {
        TimeoutOp::ALL
            .into_iter()
            .filter_map(move |op| self.get(op).map(|entry| (op, entry)))
    }

    fn slot(&self, op: TimeoutOp) -> &Option<TimeoutEntry> {
        match op {
            TimeoutOp::Create => &self.create,
            TimeoutOp::Read => &self.read,
            TimeoutOp::Update => &self.update,
            TimeoutOp::Delete => &self.delete,
        }
    }

    fn slot_mut(&mut self, op: TimeoutOp) -> &mut Option<TimeoutEntry> {
        match op {
            TimeoutOp::Create => &mut self.create,
            TimeoutOp::Read => &mut self.read,
            TimeoutOp::Update => &mut self.update,
            TimeoutOp::Delete => &mut self.delete,
        }
    }
}

/// A block that transitively contains itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircularReference {
    /// Path of the field whose resolution re-entered the block
    pub path: String,
    pub line: usize,
    pub block: String,
}

/// Structured model of one resource document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceDoc {
    pub resource_type: String,
    pub args: Properties,
    pub attrs: Properties,
    pub timeouts: DocTimeouts,
    /// Line of the `## Timeouts` heading
    pub timeouts_heading: Option<usize>,
    /// Line of the `## Import` heading
    pub import_heading: Option<usize>,
    pub example_text: String,
    /// Set when block resolution had to stop; nothing else in the model
    /// can be trusted in that case
    pub circular_reference: Option<CircularReference>,
    pub line_count: usize,
}

impl ResourceDoc {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Top-level properties of the Arguments or Attributes section
    pub fn properties(&self, section: Section) -> Option<&Properties> {
        match section {
            Section::Args => Some(&self.args),
            Section::Attr => Some(&self.attrs),
            _ => None,
        }
    }

    /// Look up a field by dot path, Arguments first
    pub fn field(&self, path: &str) -> Option<&Field> {
        self.args.lookup(path).or_else(|| self.attrs.lookup(path))
    }

    pub fn has_timeouts_section(&self) -> bool {
        self.timeouts_heading.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_first_entry_wins() {
        let mut timeouts = DocTimeouts::default();
        assert!(timeouts.is_empty());

        timeouts.set(TimeoutOp::Read, TimeoutEntry { line: 10, seconds: Some(300) });
        timeouts.set(TimeoutOp::Read, TimeoutEntry { line: 12, seconds: Some(600) });
        timeouts.set(TimeoutOp::Create, TimeoutEntry { line: 9, seconds: None });

        assert_eq!(timeouts.get(TimeoutOp::Read).unwrap().line, 10);
        let ops: Vec<TimeoutOp> = timeouts.entries().map(|(op, _)| op).collect();
        assert_eq!(ops, vec![TimeoutOp::Create, TimeoutOp::Read]);
    }
}
