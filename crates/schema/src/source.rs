//! Schema sources

use crate::description::ResourceDescription;
use crate::extractor::SchemaExtractor;
use crate::model::ResourceSchema;
use provider_doc_lint_common::{LintError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Supplies the schemas documentation is checked against
///
/// Implementations must be shareable across the worker threads of a
/// corpus run.
pub trait SchemaSource: Send + Sync {
    /// Every resource type the source knows, sorted
    fn resource_types(&self) -> Vec<String>;

    /// Schema tree of one resource
    fn resource_schema(&self, resource_type: &str) -> Result<ResourceSchema>;
}

/// Schema source backed by a directory of YAML or JSON descriptions
#[derive(Debug, Default)]
pub struct DescriptionSource {
    descriptions: BTreeMap<String, ResourceDescription>,
}

impl DescriptionSource {
    /// Load every `.yaml`, `.yml` and `.json` description below `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(LintError::NotFound(format!(
                "schema directory {}",
                dir.display()
            )));
        }

        let mut source = Self::default();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && matches!(
                        e.path().extension().and_then(|s| s.to_str()),
                        Some("yaml" | "yml" | "json")
                    )
            })
        {
            let path = entry.path();
            let content = fs::read_to_string(path)?;
            let description = ResourceDescription::parse(&content).map_err(|e| {
                LintError::Schema(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            debug!(resource = %description.resource, path = %path.display(), "Loaded schema description");
            source.add(description);
        }

        Ok(source)
    }

    /// Build a source from descriptions already in memory
    pub fn from_descriptions(descriptions: impl IntoIterator<Item = ResourceDescription>) -> Self {
        let mut source = Self::default();
        for description in descriptions {
            source.add(description);
        }
        source
    }

    fn add(&mut self, description: ResourceDescription) {
        if self.descriptions.contains_key(&description.resource) {
            warn!(resource = %description.resource, "Duplicate schema description, keeping the first");
            return;
        }
        self.descriptions
            .insert(description.resource.clone(), description);
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

impl SchemaSource for DescriptionSource {
    fn resource_types(&self) -> Vec<String> {
        self.descriptions.keys().cloned().collect()
    }

    fn resource_schema(&self, resource_type: &str) -> Result<ResourceSchema> {
        let description = self
            .descriptions
            .get(resource_type)
            .ok_or_else(|| LintError::NotFound(format!("schema for {resource_type}")))?;
        SchemaExtractor::extract(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("cache")).unwrap();
        fs::write(
            dir.path().join("cache/redis_cache.yaml"),
            "resource: azurerm_redis_cache\nfields:\n  name: { required: true }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("key_vault.json"),
            r#"{"resource": "azurerm_key_vault", "fields": {}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a schema").unwrap();

        let source = DescriptionSource::load(dir.path()).unwrap();
        assert_eq!(
            source.resource_types(),
            vec!["azurerm_key_vault".to_string(), "azurerm_redis_cache".to_string()]
        );
        let schema = source.resource_schema("azurerm_redis_cache").unwrap();
        assert!(schema.fields["name"].required);
        assert!(matches!(
            source.resource_schema("azurerm_missing"),
            Err(LintError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.yaml"), "fields: [").unwrap();
        assert!(matches!(
            DescriptionSource::load(dir.path()),
            Err(LintError::Schema(_))
        ));
        assert!(DescriptionSource::load(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let first = ResourceDescription::parse("resource: azurerm_a\ndeprecated: true\n").unwrap();
        let second = ResourceDescription::parse("resource: azurerm_a\n").unwrap();
        let source = DescriptionSource::from_descriptions([first, second]);
        assert_eq!(source.len(), 1);
        assert!(source.resource_schema("azurerm_a").unwrap().deprecated);
    }
}
