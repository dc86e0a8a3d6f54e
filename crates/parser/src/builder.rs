//! Document model builder
//!
//! Walks tokenized line items once, sorting fields into the Arguments and
//! Attributes sections and into the blocks introduced along the way, then
//! resolves every block-typed field against the collected blocks.

use crate::block::Block;
use crate::field::{Field, FormatError, TwinLink};
use crate::model::{CircularReference, ResourceDoc, TimeoutEntry};
use crate::patterns::{TIMEOUT_BULLET, TIMEOUT_DURATION};
use crate::properties::Properties;
use crate::tokenizer::{LineItem, LineKind};
use provider_doc_lint_common::duration::parse_duration;
use provider_doc_lint_common::{Section, TimeoutOp};
use tracing::debug;

/// Builds a [`ResourceDoc`] from line items
pub struct DocumentBuilder {
    doc: ResourceDoc,
    section: Section,
    open_block: Option<Block>,
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            doc: ResourceDoc::new(resource_type),
            section: Section::Default,
            open_block: None,
            blocks: Vec::new(),
        }
    }

    /// Consume the items and produce the resolved document model
    pub fn build(mut self, items: &[LineItem]) -> ResourceDoc {
        for item in items {
            self.visit(item);
        }
        self.close_block();

        debug!(
            resource = %self.doc.resource_type,
            args = self.doc.args.len(),
            attrs = self.doc.attrs.len(),
            blocks = self.blocks.len(),
            "Collected document fields"
        );

        let mut resolver = Resolver::new(&self.blocks);
        resolver.resolve(&mut self.doc.args, None);
        if resolver.circular.is_none() {
            resolver.resolve(&mut self.doc.attrs, None);
        }

        match resolver.circular {
            Some(circular) => {
                debug!(block = %circular.block, line = circular.line, "Circular block reference");
                self.doc.circular_reference = Some(circular);
            }
            None => link_twins(&mut self.doc.args, &mut self.doc.attrs),
        }

        self.doc
    }

    fn visit(&mut self, item: &LineItem) {
        match item.kind {
            LineKind::Heading(level) => {
                self.close_block();
                if level <= 2 {
                    let text = item.heading_text().unwrap_or_default();
                    self.section = Section::from_heading(text);
                    match self.section {
                        Section::Timeout if self.doc.timeouts_heading.is_none() => {
                            self.doc.timeouts_heading = Some(item.from_line)
                        }
                        Section::Import if self.doc.import_heading.is_none() => {
                            self.doc.import_heading = Some(item.from_line)
                        }
                        _ => {}
                    }
                }
            }
            LineKind::Separator => self.close_block(),
            LineKind::BlockIntro => {
                self.close_block();
                self.open_block = Block::from_item(item, self.section);
            }
            LineKind::FieldBullet => self.add_field(item),
            LineKind::TimeoutBullet => self.add_timeout(item),
            LineKind::Example if self.section == Section::Example => {
                let body = item
                    .lines
                    .iter()
                    .filter(|l| !l.trim_start().starts_with("```"));
                for line in body {
                    self.doc.example_text.push_str(line);
                    self.doc.example_text.push('\n');
                }
            }
            _ => {}
        }
    }

    fn add_field(&mut self, item: &LineItem) {
        let Some(field) = Field::from_item(item, self.section) else {
            return;
        };

        if let Some(block) = self.open_block.as_mut() {
            block.push(field);
            return;
        }

        match self.section {
            Section::Args => {
                self.doc.args.insert(field);
            }
            Section::Attr => {
                self.doc.attrs.insert(field);
            }
            _ => debug!(line = item.from_line, "Ignoring field bullet outside argument sections"),
        }
    }

    fn add_timeout(&mut self, item: &LineItem) {
        let content = item.content();
        let Some(op) = TIMEOUT_BULLET
            .captures(&content)
            .and_then(|caps| TimeoutOp::parse(&caps[1]))
        else {
            return;
        };

        let seconds = TIMEOUT_DURATION
            .captures(&content)
            .and_then(|caps| parse_duration(caps[1].trim().trim_matches('`')));

        self.doc.timeouts.set(
            op,
            TimeoutEntry {
                line: item.from_line,
                seconds,
            },
        );
    }

    fn close_block(&mut self) {
        if let Some(block) = self.open_block.take() {
            self.blocks.push(block);
        }
    }
}

enum Lookup {
    Found(usize),
    Duplicate(usize),
    Missing,
}

/// Resolves block-typed fields against the collected blocks
///
/// Keeps the indices of the blocks being expanded; re-entering one of them
/// stops the whole resolution.
struct Resolver<'a> {
    blocks: &'a [Block],
    stack: Vec<usize>,
    circular: Option<CircularReference>,
}

impl<'a> Resolver<'a> {
    fn new(blocks: &'a [Block]) -> Self {
        Self {
            blocks,
            stack: Vec::new(),
            circular: None,
        }
    }

    fn resolve(&mut self, props: &mut Properties, parent_path: Option<&str>) {
        for field in props.fields_mut() {
            if self.circular.is_some() {
                return;
            }
            if let Some(parent) = parent_path {
                field.path = format!("{parent}.{}", field.name);
            }
            if field.is_block() {
                self.resolve_field(field, parent_path);
            }
        }
    }

    fn resolve_field(&mut self, field: &mut Field, parent_path: Option<&str>) {
        let alias = field
            .block_type_name
            .clone()
            .unwrap_or_else(|| field.name.clone());

        let index = match self.find(&alias, field.section, parent_path) {
            Lookup::Found(index) => index,
            Lookup::Duplicate(index) => {
                set_error(field, FormatError::DuplicateBlock { alias: alias.clone() });
                index
            }
            Lookup::Missing => match self.find(&field.name, field.section, parent_path) {
                Lookup::Found(index) | Lookup::Duplicate(index) if alias != field.name => {
                    set_error(
                        field,
                        FormatError::MisspelledBlockRef {
                            declared: alias.clone(),
                            expected: field.name.clone(),
                        },
                    );
                    index
                }
                _ => {
                    set_error(field, FormatError::BlockNotDefined { alias });
                    return;
                }
            },
        };

        if self.stack.contains(&index) {
            self.circular = Some(CircularReference {
                path: field.path.clone(),
                line: field.line,
                block: alias,
            });
            return;
        }

        self.stack.push(index);
        let mut sub_fields = self.blocks[index].fields.clone();
        self.resolve(&mut sub_fields, Some(&field.path));
        self.stack.pop();

        field.sub_fields = Some(sub_fields);
    }

    /// Find the block for an alias, narrowing duplicates by section and
    /// then by parent
    fn find(&self, alias: &str, section: Section, parent_path: Option<&str>) -> Lookup {
        let mut candidates: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.has_alias(alias))
            .map(|(index, _)| index)
            .collect();

        if candidates.len() > 1 {
            narrow(&mut candidates, |i| self.blocks[i].section == section);
        }
        if candidates.len() > 1 {
            match parent_path {
                Some(parent) => narrow(&mut candidates, |i| self.blocks[i].belongs_to(parent)),
                None => narrow(&mut candidates, |i| self.blocks[i].parent.is_none()),
            }
        }

        match candidates.as_slice() {
            [] => Lookup::Missing,
            [index] => Lookup::Found(*index),
            [first, ..] => Lookup::Duplicate(*first),
        }
    }
}

/// Keep the matching candidates unless none match
fn narrow(candidates: &mut Vec<usize>, keep: impl Fn(usize) -> bool) {
    if candidates.iter().any(|i| keep(*i)) {
        candidates.retain(|i| keep(*i));
    }
}

fn set_error(field: &mut Field, error: FormatError) {
    if field.format_error.is_none() {
        field.format_error = Some(error);
    }
}

/// Cross-link fields documented in both Arguments and Attributes
fn link_twins(args: &mut Properties, attrs: &mut Properties) {
    let shared: Vec<String> = args
        .names()
        .filter(|name| attrs.contains(name))
        .map(String::from)
        .collect();

    for name in shared {
        let (Some(arg), Some(attr)) = (args.get_mut(&name), attrs.get_mut(&name)) else {
            continue;
        };
        arg.twin = Some(TwinLink {
            section: attr.section,
            line: attr.line,
        });
        attr.twin = Some(TwinLink {
            section: arg.section,
            line: arg.line,
        });
        if let (Some(arg_subs), Some(attr_subs)) = (arg.sub_fields.as_mut(), attr.sub_fields.as_mut())
        {
            link_twins(arg_subs, attr_subs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn build(text: &str) -> ResourceDoc {
        let lines: Vec<String> = text.lines().map(String::from).collect();
        DocumentBuilder::new("azurerm_example").build(&tokenize(&lines))
    }

    #[test]
    fn test_sections_and_blocks() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `name` - (Required) The name.\n\n\
             * `identity` - (Optional) An `identity` block as defined below.\n\n\
             ---\n\n\
             An `identity` block supports the following:\n\n\
             * `type` - (Required) The type.\n\n\
             ## Attributes Reference\n\n\
             * `id` - The ID.\n",
        );

        assert_eq!(doc.args.len(), 2);
        assert_eq!(doc.attrs.len(), 1);
        let identity = doc.args.get("identity").unwrap();
        let subs = identity.sub_fields.as_ref().unwrap();
        assert_eq!(subs.get("type").unwrap().path, "identity.type");
        assert!(identity.format_error.is_none());
    }

    #[test]
    fn test_block_not_defined() {
        let doc = build(
            "## Arguments Reference\n\n* `rule` - (Optional) A `rule` block as defined below.\n",
        );
        let rule = doc.args.get("rule").unwrap();
        assert!(rule.sub_fields.is_none());
        assert_eq!(
            rule.format_error,
            Some(FormatError::BlockNotDefined { alias: "rule".into() })
        );
    }

    #[test]
    fn test_misspelled_block_reference() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `identity` - (Optional) An `identiy` block as defined below.\n\n\
             An `identity` block supports the following:\n\n\
             * `type` - (Required) The type.\n",
        );
        let identity = doc.args.get("identity").unwrap();
        assert!(identity.sub_fields.is_some());
        assert_eq!(
            identity.format_error,
            Some(FormatError::MisspelledBlockRef {
                declared: "identiy".into(),
                expected: "identity".into(),
            })
        );
    }

    #[test]
    fn test_duplicate_block_narrowed_by_parent() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `site_config` - (Optional) A `site_config` block as defined below.\n\n\
             * `setting` - (Optional) A `setting` block as defined below.\n\n\
             A `site_config` block supports the following:\n\n\
             * `setting` - (Optional) A `setting` block as defined below.\n\n\
             A `setting` block supports the following:\n\n\
             * `top` - (Optional) Top level.\n\n\
             A `setting` block within the `site_config` block supports the following:\n\n\
             * `nested` - (Optional) Nested.\n",
        );

        let top = doc.args.get("setting").unwrap();
        assert!(top.format_error.is_none());
        assert!(top.sub_fields.as_ref().unwrap().contains("top"));

        let nested = doc.args.lookup("site_config.setting").unwrap();
        assert!(nested.format_error.is_none());
        assert!(nested.sub_fields.as_ref().unwrap().contains("nested"));
    }

    #[test]
    fn test_duplicate_block_without_context() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `rule` - (Optional) A `rule` block as defined below.\n\n\
             A `rule` block supports the following:\n\n\
             * `a` - (Optional) A.\n\n\
             A `rule` block supports the following:\n\n\
             * `b` - (Optional) B.\n",
        );
        let rule = doc.args.get("rule").unwrap();
        assert_eq!(
            rule.format_error,
            Some(FormatError::DuplicateBlock { alias: "rule".into() })
        );
        assert!(rule.sub_fields.as_ref().unwrap().contains("a"));
    }

    #[test]
    fn test_circular_block() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `foo` - (Optional) A `foo` block as defined below.\n\n\
             A `foo` block supports the following:\n\n\
             * `foo` - (Optional) A `foo` block as defined below.\n",
        );
        let circular = doc.circular_reference.unwrap();
        assert_eq!(circular.block, "foo");
        assert_eq!(circular.path, "foo.foo");
        assert_eq!(circular.line, 7);
    }

    #[test]
    fn test_twins_linked() {
        let doc = build(
            "## Arguments Reference\n\n\
             * `sku` - (Optional) The SKU.\n\n\
             ## Attributes Reference\n\n\
             * `sku` - (Optional) The SKU.\n",
        );
        let arg = doc.args.get("sku").unwrap();
        let attr = doc.attrs.get("sku").unwrap();
        assert_eq!(arg.twin, Some(TwinLink { section: Section::Attr, line: 7 }));
        assert_eq!(attr.twin, Some(TwinLink { section: Section::Args, line: 3 }));
    }

    #[test]
    fn test_timeouts_and_headings() {
        let doc = build(
            "## Example Usage\n\n```hcl\nresource \"x\" \"y\" {}\n```\n\n\
             ## Timeouts\n\n\
             * `create` - (Defaults to 90 minutes) Used when creating.\n\
             * `read` - (Defaults to 5 minutes) Used when retrieving.\n\
             * `delete` - Used when deleting.\n\n\
             ## Import\n\nText.\n",
        );
        assert_eq!(doc.timeouts_heading, Some(7));
        assert_eq!(doc.import_heading, Some(13));
        assert_eq!(doc.timeouts.create.unwrap().seconds, Some(5400));
        assert_eq!(doc.timeouts.read.unwrap().line, 10);
        assert_eq!(doc.timeouts.delete.unwrap().seconds, None);
        assert!(doc.timeouts.update.is_none());
        assert_eq!(doc.example_text, "resource \"x\" \"y\" {}\n");
    }
}
