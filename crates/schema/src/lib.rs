//! Resource schemas for provider-doc-lint
//!
//! The checker never inspects provider code. Schemas reach it through the
//! [`SchemaSource`] trait; the bundled [`DescriptionSource`] reads them from
//! YAML or JSON description files and [`SchemaExtractor`] turns each
//! description into a [`ResourceSchema`] tree.

mod description;
mod extractor;
mod model;
mod source;

pub use description::{
    DurationValue, ElemDescription, FieldDescription, ResourceDescription, ValidatorDescription,
};
pub use extractor::SchemaExtractor;
pub use model::{
    DeclaredTimeouts, DefaultValue, ResourceSchema, SchemaField, SchemaFields, SchemaNode,
};
pub use source::{DescriptionSource, SchemaSource};
