//! Common types and utilities for provider-doc-lint
//!
//! This crate contains the shared error type, the small enums every stage of
//! the pipeline agrees on (requiredness, document sections, timeout
//! operations), duration helpers and the YAML lint configuration.

pub mod config;
pub mod duration;

pub use config::{LintConfig, Suppression};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while linting documentation
#[derive(Error, Debug)]
pub enum LintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for lint operations
pub type Result<T> = std::result::Result<T, LintError>;

/// Name of the field every resource exports implicitly
pub const ID_FIELD: &str = "id";

/// Requiredness of a documented field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requiredness {
    #[default]
    Unspecified,
    Required,
    Optional,
    Computed,
}

impl Requiredness {
    /// Whether the documentation carries an explicit Required/Optional marker
    pub fn is_marked(self) -> bool {
        matches!(self, Requiredness::Required | Requiredness::Optional)
    }
}

impl fmt::Display for Requiredness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requiredness::Unspecified => write!(f, "unspecified"),
            Requiredness::Required => write!(f, "Required"),
            Requiredness::Optional => write!(f, "Optional"),
            Requiredness::Computed => write!(f, "Computed"),
        }
    }
}

/// Section of a resource document, selected by heading text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Default,
    Example,
    Args,
    Attr,
    Timeout,
    Import,
    Other,
}

impl Section {
    /// Select a section from a level 1/2 heading text
    pub fn from_heading(text: &str) -> Self {
        let lower = text.trim().trim_matches('#').trim().to_lowercase();
        if lower.starts_with("example") {
            Section::Example
        } else if lower.starts_with("argument") {
            Section::Args
        } else if lower.starts_with("attribute") {
            Section::Attr
        } else if lower.starts_with("timeout") {
            Section::Timeout
        } else if lower.starts_with("import") {
            Section::Import
        } else {
            Section::Other
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Default => "Default",
            Section::Example => "Example Usage",
            Section::Args => "Arguments Reference",
            Section::Attr => "Attributes Reference",
            Section::Timeout => "Timeouts",
            Section::Import => "Import",
            Section::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Operation a timeout applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutOp {
    Create,
    Read,
    Update,
    Delete,
}

impl TimeoutOp {
    /// All operations in canonical document order
    pub const ALL: [TimeoutOp; 4] = [
        TimeoutOp::Create,
        TimeoutOp::Read,
        TimeoutOp::Update,
        TimeoutOp::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeoutOp::Create => "create",
            TimeoutOp::Read => "read",
            TimeoutOp::Update => "update",
            TimeoutOp::Delete => "delete",
        }
    }

    /// Verb used in the canonical "Used when ..." sentence
    pub fn ing_form(self) -> &'static str {
        match self {
            TimeoutOp::Create => "creating",
            TimeoutOp::Read => "retrieving",
            TimeoutOp::Update => "updating",
            TimeoutOp::Delete => "deleting",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "create" => Some(TimeoutOp::Create),
            "read" => Some(TimeoutOp::Read),
            "update" => Some(TimeoutOp::Update),
            "delete" => Some(TimeoutOp::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for TimeoutOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human title of a resource type, e.g. `azurerm_redis_cache` -> `Redis Cache`
///
/// The provider prefix (everything up to the first underscore) is dropped.
pub fn resource_title(resource_type: &str) -> String {
    let without_prefix = resource_type
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(resource_type);

    without_prefix
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Document file stem of a resource type, e.g. `azurerm_redis_cache` -> `redis_cache`
pub fn document_stem(resource_type: &str) -> &str {
    resource_type
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(resource_type)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_from_heading() {
        assert_eq!(Section::from_heading("## Example Usage"), Section::Example);
        assert_eq!(Section::from_heading("## Arguments Reference"), Section::Args);
        assert_eq!(Section::from_heading("## Argument Reference"), Section::Args);
        assert_eq!(Section::from_heading("## Attributes Reference"), Section::Attr);
        assert_eq!(Section::from_heading("## Timeouts"), Section::Timeout);
        assert_eq!(Section::from_heading("## Import"), Section::Import);
        assert_eq!(Section::from_heading("## Something Else"), Section::Other);
    }

    #[test]
    fn test_resource_title() {
        assert_eq!(resource_title("azurerm_redis_cache"), "Redis Cache");
        assert_eq!(resource_title("azurerm_key_vault"), "Key Vault");
        assert_eq!(resource_title("plain"), "Plain");
    }

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem("azurerm_redis_cache"), "redis_cache");
        assert_eq!(document_stem("plain"), "plain");
    }

    #[test]
    fn test_timeout_op_parse() {
        assert_eq!(TimeoutOp::parse("Create"), Some(TimeoutOp::Create));
        assert_eq!(TimeoutOp::parse(" delete "), Some(TimeoutOp::Delete));
        assert_eq!(TimeoutOp::parse("patch"), None);
        assert_eq!(TimeoutOp::Read.ing_form(), "retrieving");
    }

    #[test]
    fn test_requiredness_marked() {
        assert!(Requiredness::Required.is_marked());
        assert!(Requiredness::Optional.is_marked());
        assert!(!Requiredness::Unspecified.is_marked());
        assert!(!Requiredness::Computed.is_marked());
    }
}
