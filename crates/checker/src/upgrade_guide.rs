//! Upgrade guide lookups
//!
//! A major-version upgrade guide lists per resource the properties whose
//! accepted values are about to change. Value mismatches for those
//! properties are expected and not reported.

use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Upgrade guide content, read at most once and shared by every worker
#[derive(Debug)]
pub struct UpgradeGuide {
    path: Option<PathBuf>,
    content: OnceCell<Option<String>>,
}

impl UpgradeGuide {
    /// Guide read lazily from `path` on first lookup
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            content: OnceCell::new(),
        }
    }

    /// Guide with content already in memory
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: None,
            content: OnceCell::with_value(Some(text.into())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Guide text; an unreadable file behaves like an empty guide
    pub fn content(&self) -> Option<&str> {
        self.content
            .get_or_init(|| {
                let path = self.path.as_ref()?;
                match fs::read_to_string(path) {
                    Ok(text) => {
                        debug!(path = %path.display(), "Loaded upgrade guide");
                        Some(text)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to read upgrade guide");
                        None
                    }
                }
            })
            .as_deref()
    }

    /// Whether the guide's section for `resource_type` mentions `field`
    ///
    /// A section starts at a heading naming the resource and ends at the
    /// next heading.
    pub fn documents_change(&self, resource_type: &str, field: &str) -> bool {
        let Some(content) = self.content() else {
            return false;
        };
        let field_token = format!("`{field}`");

        let mut in_section = false;
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                in_section = mentions_resource(trimmed, resource_type);
                continue;
            }
            if in_section && line.contains(&field_token) {
                return true;
            }
        }
        false
    }
}

fn mentions_resource(heading: &str, resource_type: &str) -> bool {
    heading
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word == resource_type)
}
