//! Schema description files
//!
//! A description declares one resource's fields as plain data, including
//! the enumerated values of its validators:
//!
//! ```yaml
//! resource: azurerm_redis_cache
//! timeouts: { create: 90m, read: 5m }
//! fields:
//!   name: { required: true, force_new: true }
//!   minimum_tls_version:
//!     optional: true
//!     default: "1.2"
//!     validators: [ { one_of: ["1.0", "1.1", "1.2"] } ]
//!   redis_configuration:
//!     optional: true
//!     block:
//!       maxmemory_policy: { optional: true, default: volatile-lru }
//! ```

use crate::model::DefaultValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One resource description file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceDescription {
    pub resource: String,
    #[serde(default)]
    pub deprecated: bool,
    /// Operation name to duration (`90m`, `1h30m`, `1800`)
    #[serde(default)]
    pub timeouts: BTreeMap<String, DurationValue>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDescription>,
}

/// A duration written as text or as bare seconds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

/// Declaration of one field
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FieldDescription {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub force_new: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub validators: Vec<ValidatorDescription>,
    /// Shorthand for a single `one_of` validator
    #[serde(default)]
    pub possible_values: Vec<DefaultValue>,
    /// Element schema of a list or set of scalars
    #[serde(default)]
    pub elem: Option<ElemDescription>,
    /// Nested fields of a block-typed field
    #[serde(default)]
    pub block: Option<BTreeMap<String, FieldDescription>>,
}

/// A validator attached to a field or an element
///
/// Only `one_of` carries values the documentation has to list; any other
/// validator key is accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidatorDescription {
    #[serde(default)]
    pub one_of: Option<Vec<DefaultValue>>,
}

/// Element schema of a collection field
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ElemDescription {
    #[serde(default)]
    pub validators: Vec<ValidatorDescription>,
    #[serde(default)]
    pub possible_values: Vec<DefaultValue>,
}

impl ResourceDescription {
    /// Parse a YAML or JSON description
    pub fn parse(content: &str) -> provider_doc_lint_common::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
