//! Schema introspection: join a type's static tag table with the fields its
//! value actually serializes.

use std::collections::BTreeMap;

use crate::error::{ShapeError, TagfigError};
use crate::shape;
use crate::types::{FieldDescriptor, Schema, Settings};

/// Descriptors and current values of one target, both keyed by field name.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub schema: Schema,
    pub values: BTreeMap<String, String>,
}

/// Describe every field of `target`, sorted by name.
///
/// Fails with a [`ShapeError`] if `target` is not a struct, if any field is
/// not a string, or if `T::FIELDS` tags a field the struct does not have.
/// Nothing is resolved; the target is only read.
pub fn describe<T: Settings>(target: &T) -> Result<Schema, TagfigError> {
    Ok(snapshot(target)?.schema)
}

/// Current value of every field, keyed by name.
pub fn field_values<T: Settings>(target: &T) -> Result<BTreeMap<String, String>, TagfigError> {
    Ok(snapshot(target)?.values)
}

pub(crate) fn snapshot<T: Settings>(target: &T) -> Result<Snapshot, ShapeError> {
    let record = shape::inspect(target)?;

    let mut fields = Vec::with_capacity(record.len());
    let mut values = BTreeMap::new();
    for field in record {
        let value = field.value.map_err(|kind| ShapeError::UnsupportedField {
            field: field.name.to_string(),
            kind,
        })?;

        let descriptor = match T::FIELDS.iter().find(|tag| tag.name == field.name) {
            Some(tag) => FieldDescriptor::from_tag(tag),
            None => FieldDescriptor::untagged(field.name),
        };
        fields.push(descriptor);
        values.insert(field.name.to_string(), value);
    }

    if let Some(tag) = T::FIELDS.iter().find(|tag| !values.contains_key(tag.name)) {
        return Err(ShapeError::UnknownTaggedField(tag.name.to_string()));
    }

    fields.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::trace!(fields = fields.len(), "introspected settings struct");

    Ok(Snapshot {
        schema: Schema { fields },
        values,
    })
}
