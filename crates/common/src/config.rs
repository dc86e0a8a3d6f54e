//! Lint configuration loading from YAML files
//!
//! Filters and suppressions live in an external YAML file instead of being
//! hardcoded, so a provider can carry its own list of known exceptions.
//!
//! Keys address a whole resource (`azurerm_redis_cache`), one field path of
//! a resource (`azurerm_redis_cache.redis_configuration.maxmemory_policy`) or
//! a field path in every resource (`all.tags`).

use crate::{LintError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Wildcard resource name used by `all.<path>` keys
pub const ALL_RESOURCES: &str = "all";

/// Root structure of a lint configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LintConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Resource types to check; empty means every resource
    #[serde(default)]
    pub include: Vec<String>,
    /// Resources or fields dropped from the run entirely
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Diagnostics that stay visible but never fail the run or get fixed
    #[serde(default)]
    pub suppress: Vec<Suppression>,
    /// Resources that are deprecated; a missing document is not an error
    #[serde(default)]
    pub deprecated_resources: Vec<String>,
    /// Field names never checked for forces-replacement drift
    #[serde(default = "default_force_new_exempt")]
    pub force_new_exempt: Vec<String>,
    /// Upgrade guide documenting pending property changes
    #[serde(default)]
    pub upgrade_guide: Option<PathBuf>,
}

/// A suppression entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Suppression {
    /// Resource, resource field or `all.<path>` key
    pub key: String,
    /// Diagnostic kind names this entry covers; empty covers every kind
    #[serde(default)]
    pub kinds: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_force_new_exempt() -> Vec<String> {
    vec!["resource_group_name".to_string()]
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            include: Vec::new(),
            exclude: Vec::new(),
            suppress: Vec::new(),
            deprecated_resources: Vec::new(),
            force_new_exempt: default_force_new_exempt(),
            upgrade_guide: None,
        }
    }
}

impl LintConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LintError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            LintError::Config(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: LintConfig = serde_yaml::from_str(content)?;
        if config.version != 1 {
            return Err(LintError::Config(format!(
                "Unsupported config version {}",
                config.version
            )));
        }
        Ok(config)
    }

    /// Whether a resource takes part in the run
    pub fn includes_resource(&self, resource_type: &str) -> bool {
        let allowed = self.include.is_empty() || self.include.iter().any(|r| r == resource_type);
        allowed && !self.exclude.iter().any(|key| key == resource_type)
    }

    /// Whether a field of a resource is dropped from the run
    pub fn excludes_field(&self, resource_type: &str, path: &str) -> bool {
        self.exclude
            .iter()
            .any(|key| key_matches(key, resource_type, Some(path)))
    }

    /// Whether a diagnostic of `kind` at `path` is suppressed
    pub fn is_suppressed(&self, resource_type: &str, path: Option<&str>, kind: &str) -> bool {
        self.suppress.iter().any(|entry| {
            key_matches(&entry.key, resource_type, path)
                && (entry.kinds.is_empty() || entry.kinds.iter().any(|k| k == kind))
        })
    }

    pub fn is_deprecated(&self, resource_type: &str) -> bool {
        self.deprecated_resources.iter().any(|r| r == resource_type)
    }

    pub fn is_force_new_exempt(&self, field_name: &str) -> bool {
        self.force_new_exempt.iter().any(|f| f == field_name)
    }
}

/// Match a configuration key against a resource and an optional field path
///
/// A field key also covers every path nested below it.
fn key_matches(key: &str, resource_type: &str, path: Option<&str>) -> bool {
    if key == resource_type {
        return true;
    }
    let Some(path) = path else {
        return false;
    };

    let field_key = key
        .strip_prefix(resource_type)
        .and_then(|rest| rest.strip_prefix('.'))
        .or_else(|| {
            key.strip_prefix(ALL_RESOURCES)
                .and_then(|rest| rest.strip_prefix('.'))
        });

    match field_key {
        Some(field_key) => {
            path == field_key
                || path
                    .strip_prefix(field_key)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        None => false,
    }
}
