//! Schema tree the documentation is checked against

use provider_doc_lint_common::TimeoutOp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named schema fields of a resource or a block
pub type SchemaFields = BTreeMap<String, SchemaField>;

/// A literal value as written in a schema description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl DefaultValue {
    /// Whether the value is boolean `false`, which documents omit
    pub fn is_false(&self) -> bool {
        matches!(self, DefaultValue::Bool(false))
    }

    /// Text the documentation states for this value; the empty string is
    /// rendered as `""`
    pub fn render(&self) -> String {
        match self {
            DefaultValue::String(s) if s.is_empty() => "\"\"".to_string(),
            other => other.to_string(),
        }
    }

    /// Compare against a documented default
    ///
    /// Numbers compare by value so `1` and `1.0` agree, numeric strings
    /// included; booleans ignore case.
    pub fn matches(&self, documented: &str) -> bool {
        let documented = documented.trim();
        match self {
            DefaultValue::Bool(b) => documented.eq_ignore_ascii_case(&b.to_string()),
            DefaultValue::Int(i) => documented
                .parse::<f64>()
                .is_ok_and(|d| d == *i as f64),
            DefaultValue::Float(f) => documented.parse::<f64>().is_ok_and(|d| d == *f),
            DefaultValue::String(s) => match (s.trim().parse::<f64>(), documented.parse::<f64>()) {
                (Ok(declared), Ok(value)) if declared == value => true,
                _ => documented == self.render(),
            },
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(b) => write!(f, "{b}"),
            DefaultValue::Int(i) => write!(f, "{i}"),
            DefaultValue::Float(v) => write!(f, "{v:?}"),
            DefaultValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// Leaf value or nested block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", content = "fields", rename_all = "snake_case")]
pub enum SchemaNode {
    #[default]
    Leaf,
    Block(SchemaFields),
}

/// One field of the authoritative schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaField {
    pub name: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub deprecated: bool,
    pub force_new: bool,
    pub default: Option<DefaultValue>,
    /// Enumerated legal values, ordered and deduplicated; empty means
    /// unconstrained
    pub possible_values: Vec<String>,
    pub node: SchemaNode,
}

impl SchemaField {
    /// Computed without being settable
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    pub fn block(&self) -> Option<&SchemaFields> {
        match &self.node {
            SchemaNode::Block(fields) => Some(fields),
            SchemaNode::Leaf => None,
        }
    }

    pub fn is_block(&self) -> bool {
        self.block().is_some()
    }
}

/// Timeouts declared on a resource, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeclaredTimeouts {
    pub create: Option<u64>,
    pub read: Option<u64>,
    pub update: Option<u64>,
    pub delete: Option<u64>,
}

impl DeclaredTimeouts {
    pub fn get(&self, op: TimeoutOp) -> Option<u64> {
        match op {
            TimeoutOp::Create => self.create,
            TimeoutOp::Read => self.read,
            TimeoutOp::Update => self.update,
            TimeoutOp::Delete => self.delete,
        }
    }

    pub fn set(&mut self, op: TimeoutOp, seconds: u64) {
        let slot = match op {
            TimeoutOp::Create => &mut self.create,
            TimeoutOp::Read => &mut self.read,
            TimeoutOp::Update => &mut self.update,
            TimeoutOp::Delete => &mut self.delete,
        };
        *slot = Some(seconds);
    }

    /// Declared operations in canonical order
    pub fn declared(&self) -> impl Iterator<Item = (TimeoutOp, u64)> + '_ {
        TimeoutOp::ALL
            .into_iter()
            .filter_map(move |op| self.get(op).map(|secs| (op, secs)))
    }

    pub fn is_empty(&self) -> bool {
        self.declared().next().is_none()
    }
}

/// Schema of one resource
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub deprecated: bool,
    pub fields: SchemaFields,
    pub timeouts: DeclaredTimeouts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches() {
        assert!(DefaultValue::Int(1).matches("1.0"));
        assert!(DefaultValue::Float(1.5).matches("1.50"));
        assert!(!DefaultValue::Int(2).matches("two"));
        assert!(DefaultValue::Bool(true).matches("True"));
        assert!(DefaultValue::String("volatile-lru".into()).matches("volatile-lru"));
        assert!(DefaultValue::String(String::new()).matches("\"\""));
    }

    #[test]
    fn test_numeric_string_default_matches_by_value() {
        assert!(DefaultValue::String("1".into()).matches("1.0"));
        assert!(DefaultValue::String("0.50".into()).matches("0.5"));
        assert!(!DefaultValue::String("1".into()).matches("2"));
        assert!(!DefaultValue::String("1".into()).matches("one"));
    }

    #[test]
    fn test_default_render() {
        assert_eq!(DefaultValue::String(String::new()).render(), "\"\"");
        assert_eq!(DefaultValue::Bool(false).render(), "false");
        assert_eq!(DefaultValue::Float(1.2).render(), "1.2");
        assert!(DefaultValue::Bool(false).is_false());
        assert!(!DefaultValue::String("false".into()).is_false());
    }

    #[test]
    fn test_declared_timeouts() {
        let mut timeouts = DeclaredTimeouts::default();
        assert!(timeouts.is_empty());
        timeouts.set(TimeoutOp::Delete, 1800);
        timeouts.set(TimeoutOp::Create, 3600);
        let declared: Vec<_> = timeouts.declared().collect();
        assert_eq!(
            declared,
            vec![(TimeoutOp::Create, 3600), (TimeoutOp::Delete, 1800)]
        );
    }
}
