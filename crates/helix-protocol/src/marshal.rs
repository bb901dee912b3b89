//! # Generic JSON Marshaling
//!
//! Serialization and deserialization of protocol objects, driven
//! entirely by the embedded-type map on each descriptor — there is no
//! per-type marshaling code anywhere.
//!
//! Construction is lenient, validation is strict: [`from_json_dict`]
//! never fails, accepting structurally malformed input and leaving the
//! diagnosis to one unified [`validate`](crate::validate::validate)
//! pass instead of failing eagerly field by field.

use serde_json::Value;

use crate::descriptor::TypeDescriptor;
use crate::object::{FieldValue, ProtocolObject};
use crate::registry::ProtocolRegistry;

/// Serialize a protocol object to a JSON mapping keyed by field name.
///
/// Total and deterministic for any well-formed instance: every field is
/// emitted (in name order), nested objects become nested JSON objects,
/// object lists become JSON arrays of objects, and scalar fields pass
/// through as-is.
pub fn to_json_dict(obj: &ProtocolObject) -> Value {
    let mut map = serde_json::Map::new();
    for (name, value) in obj.fields() {
        let json = match value {
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Object(nested) => to_json_dict(nested),
            FieldValue::ObjectList(items) => Value::Array(items.iter().map(to_json_dict).collect()),
        };
        map.insert(name.to_string(), json);
    }
    Value::Object(map)
}

/// Reconstruct a protocol object from a JSON mapping.
///
/// Never fails. Fields absent from the input keep their schema default;
/// keys with no corresponding field are dropped. For a field the
/// descriptor marks as embedded, an object value (or a non-empty array
/// whose elements are all objects) is recursively constructed; any
/// other shape — including the empty array, whose canonical form is the
/// raw value — is retained as a raw value so `validate` can report it.
pub fn from_json_dict(
    dict: &Value,
    descriptor: &TypeDescriptor,
    registry: &ProtocolRegistry,
) -> ProtocolObject {
    let mut obj = ProtocolObject::new(descriptor);
    let Some(map) = dict.as_object() else {
        return obj;
    };

    for field in descriptor.fields() {
        let Some(value) = map.get(&field.name) else {
            continue;
        };
        let nested = descriptor
            .embedded_type(&field.name)
            .and_then(|name| registry.descriptor(name));
        let assigned = match (nested, value) {
            (Some(desc), Value::Object(_)) => {
                FieldValue::Object(Box::new(from_json_dict(value, desc, registry)))
            }
            // An empty array falls through to the scalar arm: the empty
            // embedded list's canonical representation is the raw empty
            // array, matching default construction and set_object_list.
            (Some(desc), Value::Array(items))
                if !items.is_empty() && items.iter().all(Value::is_object) =>
            {
                FieldValue::ObjectList(
                    items
                        .iter()
                        .map(|item| from_json_dict(item, desc, registry))
                        .collect(),
                )
            }
            _ => FieldValue::Scalar(value.clone()),
        };
        // The field name comes from the descriptor itself, so this
        // cannot hit the closed-set error.
        let _ = match assigned {
            FieldValue::Object(o) => obj.set_object(&field.name, *o),
            FieldValue::ObjectList(items) => obj.set_object_list(&field.name, items),
            FieldValue::Scalar(v) => obj.set(&field.name, v),
        };
    }
    obj
}
