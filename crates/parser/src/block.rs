//! Block introductions and their field lists

use crate::field::Field;
use crate::patterns::{BACKTICK_TOKEN, BLOCK_INTRO, BLOCK_PARENT};
use crate::properties::Properties;
use crate::tokenizer::LineItem;
use provider_doc_lint_common::Section;
use serde::Serialize;

/// A documented block, e.g. "A `identity` block supports the following:"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Names the block is referenced by, at least one
    pub aliases: Vec<String>,
    /// Field the block belongs to, from "of `parent`" / "within `parent`"
    pub parent: Option<String>,
    pub line: usize,
    pub section: Section,
    pub fields: Properties,
}

impl Block {
    /// Read a block from a block-introduction item
    pub fn from_item(item: &LineItem, section: Section) -> Option<Self> {
        let content = item.content();
        let caps = BLOCK_INTRO.captures(&content)?;

        let aliases: Vec<String> = BACKTICK_TOKEN
            .captures_iter(caps.get(1)?.as_str())
            .map(|c| c[1].trim().to_string())
            .filter(|alias| !alias.is_empty())
            .collect();
        if aliases.is_empty() {
            return None;
        }

        let parent = caps
            .get(2)
            .and_then(|tail| BLOCK_PARENT.captures(tail.as_str()))
            .map(|c| c[1].trim().to_string());

        Some(Self {
            aliases,
            parent,
            line: item.from_line,
            section,
            fields: Properties::new(),
        })
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    /// Add a field; a repeated name marks the first one as duplicated
    pub fn push(&mut self, mut field: Field) {
        field.section = self.section;
        self.fields.insert(field);
    }

    /// Whether the block's parent matches a field's parent path
    pub fn belongs_to(&self, parent_path: &str) -> bool {
        match &self.parent {
            Some(parent) => {
                parent == parent_path
                    || parent_path.rsplit('.').next().is_some_and(|last| last == parent)
            }
            None => false,
        }
    }
}
