//! # Type Descriptors
//!
//! The queryable metadata for one protocol type: its field set, default
//! values, the subset of fields that are mandatory, and the subset of
//! fields that embed other protocol types.
//!
//! Descriptors are plain data. The runtime object model
//! ([`crate::object`], [`crate::marshal`], [`crate::validate`]) is a
//! generic engine parameterized over them, so no per-type marshaling or
//! validation code exists anywhere in the workspace.
//!
//! ## Invariants
//!
//! - Record fields are sorted lexicographically by name, regardless of
//!   declaration order, so derived output is stable across runs.
//! - Every field is in exactly one of {has-default, required}.
//! - `embedded` maps a field name to a record type name iff the field's
//!   type is a direct record, an array of records, or a nullable record.
//! - Enum symbols keep declaration order; symbols have no lexicographic
//!   meaning on the wire.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// The closed type language for schema field declarations.
///
/// `Nullable` is the canonical form of a two-branch `{null, T}` union.
/// Union shapes outside that form are rejected by the schema compiler
/// before a `FieldType` is ever built, so the runtime never has to
/// reason about arbitrary unions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    /// A sequence of homogeneous elements.
    Array(Box<FieldType>),
    /// A string-keyed mapping with homogeneous values.
    Map(Box<FieldType>),
    /// A reference to another record type, by name.
    Record(std::string::String),
    /// A reference to an enum type, by name.
    Enum(std::string::String),
    /// A two-branch `{null, T}` union.
    Nullable(Box<FieldType>),
}

impl FieldType {
    /// The record type name this field type embeds, if any.
    ///
    /// A field embeds another protocol type iff it is a direct record,
    /// an array of records, or a nullable record. Enums are not embedded
    /// (they serialize as their string symbol), and maps of records are
    /// rejected by the compiler.
    pub fn embedded_record(&self) -> Option<&str> {
        match self {
            FieldType::Record(name) => Some(name.as_str()),
            FieldType::Array(inner) | FieldType::Nullable(inner) => match inner.as_ref() {
                FieldType::Record(name) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// True when a JSON `null` is an acceptable value for this type.
    pub fn accepts_null(&self) -> bool {
        matches!(self, FieldType::Null | FieldType::Nullable(_))
    }
}

// ---------------------------------------------------------------------------
// Field descriptors
// ---------------------------------------------------------------------------

/// One named field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// The field name, unique within its record.
    pub name: String,
    /// The declared type.
    pub ty: FieldType,
    /// The declared default value, captured verbatim from the schema.
    /// `None` means the schema declared no default, which makes the
    /// field required — independent of nullability.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// A field with no declared default (required).
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A field carrying a declared default value.
    pub fn with_default(name: impl Into<String>, ty: FieldType, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }

    /// A field is required iff its declaration carries no default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// The value a fresh object holds for this field.
    ///
    /// The declared default when present; otherwise an empty container
    /// for array- and map-typed fields, and JSON `null` for everything
    /// else. Constructing from descriptors alone never fails.
    pub fn default_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match self.ty {
            FieldType::Array(_) => Value::Array(Vec::new()),
            FieldType::Map(_) => Value::Object(serde_json::Map::new()),
            _ => Value::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Type descriptors
// ---------------------------------------------------------------------------

/// The two schema shapes the protocol supports, besides the nullable
/// union folded into [`FieldType::Nullable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Record,
    Enum,
}

/// The extracted, queryable metadata for one protocol type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    /// Sorted lexicographically by field name. Empty for enums.
    fields: Vec<FieldDescriptor>,
    /// Names of fields lacking a default value.
    required: BTreeSet<String>,
    /// Field name → embedded record type name.
    embedded: BTreeMap<String, String>,
    /// Declaration-ordered symbol list. Empty for records.
    symbols: Vec<String>,
}

impl TypeDescriptor {
    /// Build a record descriptor from its fields.
    ///
    /// Fields are sorted by name here, so callers may supply them in any
    /// order; the required set and the embedded-type map are derived from
    /// the field declarations, keeping this the single source of truth
    /// for both the schema compiler and the built-in definitions.
    pub fn record(name: impl Into<String>, mut fields: Vec<FieldDescriptor>) -> Self {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        let required = fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name.clone())
            .collect();
        let embedded = fields
            .iter()
            .filter_map(|f| {
                f.ty.embedded_record()
                    .map(|t| (f.name.clone(), t.to_string()))
            })
            .collect();
        Self {
            name: name.into(),
            kind: TypeKind::Record,
            fields,
            required,
            embedded,
            symbols: Vec::new(),
        }
    }

    /// Build an enum descriptor. Symbols keep their declaration order.
    pub fn enumeration(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Enum,
            fields: Vec::new(),
            required: BTreeSet::new(),
            embedded: BTreeMap::new(),
            symbols,
        }
    }

    /// The unique type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record or enum.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The name-sorted field list.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up one field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The set of field names lacking a default value.
    pub fn required_fields(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Whether the named field lacks a default value.
    pub fn is_required(&self, field: &str) -> bool {
        self.required.contains(field)
    }

    /// Whether the named field embeds another record type.
    pub fn is_embedded(&self, field: &str) -> bool {
        self.embedded.contains_key(field)
    }

    /// The record type name the named field embeds, if any.
    pub fn embedded_type(&self, field: &str) -> Option<&str> {
        self.embedded.get(field).map(String::as_str)
    }

    /// Field name → embedded record type name, for generic traversal.
    pub fn embedded_types(&self) -> &BTreeMap<String, String> {
        &self.embedded
    }

    /// The declaration-ordered symbol list (empty for records).
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Whether the given string is one of this enum's symbols.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}
