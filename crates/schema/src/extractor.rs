//! Schema extraction from descriptions

use crate::description::{DurationValue, FieldDescription, ResourceDescription};
use crate::model::{
    DeclaredTimeouts, DefaultValue, ResourceSchema, SchemaField, SchemaFields, SchemaNode,
};
use provider_doc_lint_common::duration::parse_duration;
use provider_doc_lint_common::{LintError, Result, TimeoutOp};
use std::collections::BTreeMap;

/// Walks a [`ResourceDescription`] into a [`ResourceSchema`]
pub struct SchemaExtractor;

impl SchemaExtractor {
    /// Extract the schema tree of one resource
    ///
    /// # Examples
    /// ```
    /// use provider_doc_lint_schema::{ResourceDescription, SchemaExtractor};
    ///
    /// let description = ResourceDescription::parse(
    ///     "resource: azurerm_example\nfields:\n  name: { required: true }\n",
    /// ).unwrap();
    /// let schema = SchemaExtractor::extract(&description).unwrap();
    /// assert!(schema.fields["name"].required);
    /// ```
    pub fn extract(description: &ResourceDescription) -> Result<ResourceSchema> {
        let resource = &description.resource;
        Ok(ResourceSchema {
            resource_type: resource.clone(),
            deprecated: description.deprecated,
            fields: extract_fields(resource, None, &description.fields)?,
            timeouts: extract_timeouts(resource, &description.timeouts)?,
        })
    }
}

fn extract_fields(
    resource: &str,
    parent: Option<&str>,
    fields: &BTreeMap<String, FieldDescription>,
) -> Result<SchemaFields> {
    let mut extracted = SchemaFields::new();
    for (name, field) in fields {
        let path = match parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name.clone(),
        };
        extracted.insert(name.clone(), extract_field(resource, &path, name, field)?);
    }
    Ok(extracted)
}

fn extract_field(
    resource: &str,
    path: &str,
    name: &str,
    field: &FieldDescription,
) -> Result<SchemaField> {
    match (field.required, field.optional, field.computed) {
        (true, true, _) => {
            return Err(schema_error(resource, path, "is both required and optional"));
        }
        (true, _, true) => {
            return Err(schema_error(resource, path, "is both required and computed"));
        }
        (false, false, false) => {
            return Err(schema_error(
                resource,
                path,
                "must be required, optional or computed",
            ));
        }
        _ => {}
    }

    let node = match &field.block {
        Some(block) => SchemaNode::Block(extract_fields(resource, Some(path), block)?),
        None => SchemaNode::Leaf,
    };

    Ok(SchemaField {
        name: name.to_string(),
        required: field.required,
        optional: field.optional,
        computed: field.computed,
        deprecated: field.deprecated,
        force_new: field.force_new,
        default: field.default.clone(),
        possible_values: possible_values(field),
        node,
    })
}

/// Values of every `one_of` validator of the field and its element schema
fn possible_values(field: &FieldDescription) -> Vec<String> {
    let elem = field.elem.as_ref();
    let validators = field
        .validators
        .iter()
        .chain(elem.into_iter().flat_map(|e| e.validators.iter()))
        .filter_map(|v| v.one_of.as_ref())
        .flatten();

    let values = field
        .possible_values
        .iter()
        .chain(elem.into_iter().flat_map(|e| e.possible_values.iter()))
        .chain(validators)
        .map(DefaultValue::to_string);

    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn extract_timeouts(
    resource: &str,
    timeouts: &BTreeMap<String, DurationValue>,
) -> Result<DeclaredTimeouts> {
    let mut declared = DeclaredTimeouts::default();
    for (name, value) in timeouts {
        let op = TimeoutOp::parse(name).ok_or_else(|| {
            LintError::Schema(format!("{resource}: unknown timeout operation `{name}`"))
        })?;
        let seconds = match value {
            DurationValue::Seconds(seconds) => *seconds,
            DurationValue::Text(text) => parse_duration(text).ok_or_else(|| {
                LintError::Schema(format!("{resource}: invalid {name} timeout `{text}`"))
            })?,
        };
        declared.set(op, seconds);
    }
    Ok(declared)
}

fn schema_error(resource: &str, path: &str, problem: &str) -> LintError {
    LintError::Schema(format!("{resource}: field `{path}` {problem}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(yaml: &str) -> Result<ResourceSchema> {
        SchemaExtractor::extract(&ResourceDescription::parse(yaml).unwrap())
    }

    #[test]
    fn test_nested_blocks() {
        let schema = extract(
            r#"
resource: azurerm_redis_cache
fields:
  redis_configuration:
    optional: true
    computed: true
    block:
      maxmemory_policy: { optional: true, default: volatile-lru }
      rdb:
        optional: true
        block:
          frequency: { required: true }
"#,
        )
        .unwrap();

        let config = &schema.fields["redis_configuration"];
        assert!(config.is_block());
        assert!(!config.is_computed_only());
        let inner = config.block().unwrap();
        assert_eq!(
            inner["maxmemory_policy"].default,
            Some(DefaultValue::String("volatile-lru".into()))
        );
        assert!(inner["rdb"].block().unwrap()["frequency"].required);
    }

    #[test]
    fn test_possible_values_merged_in_order() {
        let schema = extract(
            r#"
resource: azurerm_example
fields:
  zones:
    optional: true
    possible_values: ["1"]
    elem:
      validators:
        - one_of: ["1", "2"]
        - one_of: ["3"]
"#,
        )
        .unwrap();
        assert_eq!(schema.fields["zones"].possible_values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_invalid_requiredness() {
        let err = extract(
            "resource: azurerm_example\nfields:\n  name: { required: true, optional: true }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("both required and optional"));

        assert!(extract("resource: azurerm_example\nfields:\n  name: {}\n").is_err());
        assert!(extract(
            "resource: azurerm_example\nfields:\n  block:\n    optional: true\n    block:\n      bad: {}\n"
        )
        .is_err());
    }

    #[test]
    fn test_timeouts() {
        let schema = extract(
            "resource: azurerm_example\ntimeouts: { create: 1h30m, read: 300, delete: 30m }\n",
        )
        .unwrap();
        assert_eq!(schema.timeouts.get(TimeoutOp::Create), Some(5400));
        assert_eq!(schema.timeouts.get(TimeoutOp::Read), Some(300));
        assert_eq!(schema.timeouts.get(TimeoutOp::Update), None);
        assert_eq!(schema.timeouts.get(TimeoutOp::Delete), Some(1800));

        assert!(extract("resource: azurerm_example\ntimeouts: { patch: 5m }\n").is_err());
        assert!(extract("resource: azurerm_example\ntimeouts: { create: soon }\n").is_err());
    }
}
