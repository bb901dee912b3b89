//! # One-Pass Shape Validation
//!
//! Compares a raw JSON mapping against a type descriptor and collects
//! **every** violation into one report — required fields that are
//! missing, and present fields whose value does not match the declared
//! shape. Downstream error messages enumerate the full report in a
//! single deterministic pass, so stopping at the first violation would
//! change wire-visible text.
//!
//! Validation is pure and in-memory, bounded by the depth of the object
//! graph; it performs no I/O and holds no state.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::descriptor::{FieldType, TypeDescriptor};
use crate::registry::ProtocolRegistry;

// ---------------------------------------------------------------------------
// Validation report
// ---------------------------------------------------------------------------

/// The set of field-name/value pairs found invalid during one
/// validation pass. Field order is deterministic (sorted by name), so
/// formatted messages are reproducible for the same input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    invalid: BTreeMap<String, Value>,
}

impl ValidationReport {
    /// True when no violations were found.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    /// The invalid fields, in name order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.invalid.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of invalid fields.
    pub fn len(&self) -> usize {
        self.invalid.len()
    }

    /// True when the report is empty (the input was valid).
    pub fn is_empty(&self) -> bool {
        self.invalid.is_empty()
    }

    fn flag(&mut self, field: &str, value: Value) {
        self.invalid.insert(field.to_string(), value);
    }
}

impl fmt::Display for ValidationReport {
    /// Renders as a repr-style dict, e.g. `{'start': 'thisIsWrong'}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.invalid.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': {}", name, json_repr(value))?;
        }
        f.write_str("}")
    }
}

/// Deterministic repr-style rendering of a JSON value: single-quoted
/// strings and keys, object keys sorted. Used for validation reports
/// and for echoing offending payloads in exception messages, so the
/// same input always produces the same message text.
pub fn json_repr(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(json_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let inner: Vec<String> = keys
                .into_iter()
                .map(|k| format!("'{}': {}", k, json_repr(&map[k])))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a raw JSON mapping against a record descriptor.
///
/// Checks that every required field is present and non-null, and that
/// every present declared field matches its declared shape (embedded
/// fields recurse through the registry). All violations are collected;
/// an empty report means the mapping is a valid instance. Keys with no
/// corresponding field are ignored, matching the lenient construction
/// in [`crate::marshal::from_json_dict`].
pub fn validate(
    dict: &Value,
    descriptor: &TypeDescriptor,
    registry: &ProtocolRegistry,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(map) = dict.as_object() else {
        // Not a mapping at all: every required field is missing.
        for name in descriptor.required_fields() {
            report.flag(name, Value::Null);
        }
        return report;
    };

    for name in descriptor.required_fields() {
        match map.get(name) {
            None | Some(Value::Null) => report.flag(name, Value::Null),
            Some(_) => {}
        }
    }

    for (key, value) in map {
        let Some(field) = descriptor.field(key) else {
            continue;
        };
        if !shape_matches(value, &field.ty, registry) {
            report.flag(key, value.clone());
        }
    }

    report
}

/// Whether one JSON value matches one declared field type.
///
/// Embedded records recurse into a full nested validation; the nested
/// report is not surfaced — the enclosing field is reported with its
/// whole offending value, which keeps top-level reports flat while the
/// rendered value still shows where the mismatch sits.
fn shape_matches(value: &Value, ty: &FieldType, registry: &ProtocolRegistry) -> bool {
    match ty {
        FieldType::Null => value.is_null(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Int | FieldType::Long => value.is_i64() || value.is_u64(),
        FieldType::Float | FieldType::Double => value.is_number(),
        FieldType::Bytes | FieldType::String => value.is_string(),
        FieldType::Enum(name) => match (value.as_str(), registry.descriptor(name)) {
            (Some(symbol), Some(desc)) => desc.has_symbol(symbol),
            _ => false,
        },
        FieldType::Record(name) => match registry.descriptor(name) {
            Some(desc) => value.is_object() && validate(value, desc, registry).is_valid(),
            None => false,
        },
        FieldType::Nullable(inner) => value.is_null() || shape_matches(value, inner, registry),
        FieldType::Array(inner) => match value.as_array() {
            Some(items) => items.iter().all(|v| shape_matches(v, inner, registry)),
            None => false,
        },
        FieldType::Map(inner) => match value.as_object() {
            Some(map) => map.values().all(|v| shape_matches(v, inner, registry)),
            None => false,
        },
    }
}
