//! # Protocol Objects
//!
//! A runtime instance of one record descriptor. The attribute set is
//! closed: every descriptor field exists from construction (initialized
//! to its schema default), and assigning to any other name is an error
//! rather than an ad hoc attribute.
//!
//! Objects live for a single request or response: constructed fresh,
//! mutated by the owning handler, serialized once at the transport
//! boundary, then discarded.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::descriptor::TypeDescriptor;

/// Errors from protocol object mutation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ObjectError {
    /// Assignment to a field name outside the descriptor's field set.
    #[error("type {type_name} has no field named {field}")]
    UnknownField {
        /// The owning type.
        type_name: String,
        /// The rejected field name.
        field: String,
    },
}

/// One field's runtime value.
///
/// Embedded fields hold structured objects so serialization can recurse
/// without consulting per-type code; everything else is a raw JSON
/// value. A lenient [`from_json_dict`](crate::marshal::from_json_dict)
/// may leave a mis-shaped value in `Scalar` position even for an
/// embedded field — that is deliberate, and `validate` flags it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A raw JSON value: scalar, array of scalars, or map. An empty
    /// embedded list is also held here, as the raw empty array — its
    /// single canonical representation (see [`ProtocolObject::set_object_list`]).
    Scalar(Value),
    /// A nested protocol object.
    Object(Box<ProtocolObject>),
    /// A non-empty sequence of nested protocol objects.
    ObjectList(Vec<ProtocolObject>),
}

/// A runtime instance conforming to one record descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolObject {
    type_name: String,
    values: BTreeMap<String, FieldValue>,
}

impl ProtocolObject {
    /// Construct a fresh instance with every field at its schema
    /// default. Never fails: fields without declared defaults start as
    /// `null` (or an empty container for array/map types).
    pub fn new(descriptor: &TypeDescriptor) -> Self {
        let values = descriptor
            .fields()
            .iter()
            .map(|f| (f.name.clone(), FieldValue::Scalar(f.default_value())))
            .collect();
        Self {
            type_name: descriptor.name().to_string(),
            values,
        }
    }

    /// The descriptor name this object conforms to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Read one field's current value.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Assign a raw JSON value to a field.
    ///
    /// The attribute set is closed: names outside the descriptor's
    /// field list are rejected.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), ObjectError> {
        self.set_field(field, FieldValue::Scalar(value))
    }

    /// Assign a nested object to an embedded field.
    pub fn set_object(&mut self, field: &str, object: ProtocolObject) -> Result<(), ObjectError> {
        self.set_field(field, FieldValue::Object(Box::new(object)))
    }

    /// Assign a sequence of nested objects to an embedded field.
    ///
    /// An empty sequence is stored as the raw empty array — the same
    /// value default construction produces — so every object has one
    /// canonical representation and deep equality holds across a
    /// serialize/deserialize round trip.
    pub fn set_object_list(
        &mut self,
        field: &str,
        objects: Vec<ProtocolObject>,
    ) -> Result<(), ObjectError> {
        if objects.is_empty() {
            return self.set_field(field, FieldValue::Scalar(Value::Array(Vec::new())));
        }
        self.set_field(field, FieldValue::ObjectList(objects))
    }

    /// Iterate fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), ObjectError> {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ObjectError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            }),
        }
    }
}
