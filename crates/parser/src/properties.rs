//! Name-keyed field collections

use crate::field::{Field, FormatError};
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};

/// Mapping of field name to field
///
/// A repeated name keeps the first occurrence and flags it with
/// [`FormatError::DuplicateField`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Field>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field; returns `false` when the name was already present
    pub fn insert(&mut self, field: Field) -> bool {
        match self.0.entry(field.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(field);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.format_error.is_none() {
                    existing.format_error = Some(FormatError::DuplicateField { line: field.line });
                }
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.0.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Look up a dot-separated path through resolved blocks
    pub fn lookup(&self, path: &str) -> Option<&Field> {
        let mut segments = path.split('.');
        let mut field = self.get(segments.next()?)?;
        for segment in segments {
            field = field.sub_fields.as_ref()?.get(segment)?;
        }
        Some(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.0.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.0.values()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.0.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Field> for Properties {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut props = Properties::new();
        for field in iter {
            props.insert(field);
        }
        props
    }
}
