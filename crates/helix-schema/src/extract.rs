//! # Type Descriptor Extraction
//!
//! Turns one parsed schema into a [`TypeDescriptor`]: primitive
//! keywords become concrete field types, named references are resolved
//! to record or enum references against the version's type index, and
//! unions are folded into the canonical nullable form.
//!
//! Field sorting, required-field detection, and the embedded-type map
//! are derived inside [`TypeDescriptor::record`] itself, so the
//! compiler and the built-in definitions share one set of rules.
//!
//! ## Union shapes
//!
//! The protocol supports exactly one union shape: two branches, one of
//! which is the null primitive. The null branch may appear in either
//! position — the check is order-independent, so a schema restructuring
//! that flips branch order does not silently change semantics. Every
//! other union shape is an explicit extraction error, never ignored.

use std::collections::BTreeMap;

use thiserror::Error;

use helix_protocol::{FieldDescriptor, FieldType, TypeDescriptor, TypeKind};

use crate::source::{ParsedKind, ParsedSchema, Primitive, TypeExpr};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unsupported or unresolvable constructs found during extraction.
/// These are compile-time failures: the generation run aborts with no
/// partial output.
#[derive(Error, Debug)]
pub enum SchemaShapeError {
    /// A field references a type name the version does not define.
    #[error("{record}.{field} references unknown type {target}")]
    UnresolvedType {
        /// The record being extracted.
        record: String,
        /// The referencing field.
        field: String,
        /// The unknown name.
        target: String,
    },

    /// A union that is not a two-branch `{null, T}` pair.
    #[error("{record}.{field}: unsupported union shape ({detail})")]
    UnsupportedUnion {
        /// The record being extracted.
        record: String,
        /// The offending field.
        field: String,
        /// What made the shape unsupported.
        detail: String,
    },

    /// A map whose value type is a record. The embedded-type map has no
    /// representation for map-embedded records, so the shape is
    /// rejected rather than silently treated as a scalar container.
    #[error("{record}.{field}: maps of record values are not supported")]
    MapOfRecords {
        /// The record being extracted.
        record: String,
        /// The offending field.
        field: String,
    },
}

// ---------------------------------------------------------------------------
// Type index
// ---------------------------------------------------------------------------

/// Name → kind lookup for every type defined in one version, used to
/// resolve named references while extracting a single schema.
#[derive(Debug, Default)]
pub struct TypeIndex {
    kinds: BTreeMap<String, TypeKind>,
}

impl TypeIndex {
    /// Index the full parsed schema set of one version.
    pub fn from_schemas(schemas: &[ParsedSchema]) -> Self {
        let kinds = schemas
            .iter()
            .map(|s| {
                let kind = match s.kind {
                    ParsedKind::Record { .. } => TypeKind::Record,
                    ParsedKind::Enum { .. } => TypeKind::Enum,
                };
                (s.name.clone(), kind)
            })
            .collect();
        Self { kinds }
    }

    /// The kind of a named type, if defined.
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.kinds.get(name).copied()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the type descriptor for one parsed schema.
pub fn extract(
    schema: &ParsedSchema,
    index: &TypeIndex,
) -> Result<TypeDescriptor, SchemaShapeError> {
    match &schema.kind {
        ParsedKind::Enum { symbols } => Ok(TypeDescriptor::enumeration(
            schema.name.clone(),
            symbols.clone(),
        )),
        ParsedKind::Record { fields } => {
            let mut descriptors = Vec::with_capacity(fields.len());
            for field in fields {
                let ty = lower(&field.ty, &schema.name, &field.name, index)?;
                descriptors.push(FieldDescriptor {
                    name: field.name.clone(),
                    ty,
                    default: field.default.clone(),
                });
            }
            Ok(TypeDescriptor::record(schema.name.clone(), descriptors))
        }
    }
}

/// Lower one raw type expression into a concrete [`FieldType`].
fn lower(
    expr: &TypeExpr,
    record: &str,
    field: &str,
    index: &TypeIndex,
) -> Result<FieldType, SchemaShapeError> {
    match expr {
        TypeExpr::Primitive(primitive) => Ok(match primitive {
            Primitive::Null => FieldType::Null,
            Primitive::Boolean => FieldType::Boolean,
            Primitive::Int => FieldType::Int,
            Primitive::Long => FieldType::Long,
            Primitive::Float => FieldType::Float,
            Primitive::Double => FieldType::Double,
            Primitive::Bytes => FieldType::Bytes,
            Primitive::String => FieldType::String,
        }),
        TypeExpr::Named(name) => match index.kind_of(name) {
            Some(TypeKind::Record) => Ok(FieldType::Record(name.clone())),
            Some(TypeKind::Enum) => Ok(FieldType::Enum(name.clone())),
            None => Err(SchemaShapeError::UnresolvedType {
                record: record.to_string(),
                field: field.to_string(),
                target: name.clone(),
            }),
        },
        TypeExpr::Array(inner) => Ok(FieldType::Array(Box::new(lower(
            inner, record, field, index,
        )?))),
        TypeExpr::Map(inner) => {
            let lowered = lower(inner, record, field, index)?;
            if matches!(lowered, FieldType::Record(_)) {
                return Err(SchemaShapeError::MapOfRecords {
                    record: record.to_string(),
                    field: field.to_string(),
                });
            }
            Ok(FieldType::Map(Box::new(lowered)))
        }
        TypeExpr::Union(branches) => lower_union(branches, record, field, index),
    }
}

/// Fold a union into [`FieldType::Nullable`].
///
/// Exactly two branches, exactly one of which is the null primitive —
/// in either position. Everything else is an unsupported shape.
fn lower_union(
    branches: &[TypeExpr],
    record: &str,
    field: &str,
    index: &TypeIndex,
) -> Result<FieldType, SchemaShapeError> {
    let unsupported = |detail: String| SchemaShapeError::UnsupportedUnion {
        record: record.to_string(),
        field: field.to_string(),
        detail,
    };

    if branches.len() != 2 {
        return Err(unsupported(format!(
            "{} branches, expected 2",
            branches.len()
        )));
    }
    let is_null = |b: &TypeExpr| matches!(b, TypeExpr::Primitive(Primitive::Null));
    let other = match (is_null(&branches[0]), is_null(&branches[1])) {
        (true, false) => &branches[1],
        (false, true) => &branches[0],
        (true, true) => return Err(unsupported("both branches are null".to_string())),
        (false, false) => return Err(unsupported("no null branch".to_string())),
    };
    let inner = lower(other, record, field, index)?;
    Ok(FieldType::Nullable(Box::new(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ParsedField;
    use serde_json::json;

    fn record(name: &str, fields: Vec<ParsedField>) -> ParsedSchema {
        ParsedSchema {
            name: name.to_string(),
            kind: ParsedKind::Record { fields },
        }
    }

    fn field(name: &str, ty: TypeExpr) -> ParsedField {
        ParsedField {
            name: name.to_string(),
            ty,
            default: None,
        }
    }

    fn index_with(entries: &[(&str, TypeKind)]) -> TypeIndex {
        TypeIndex {
            kinds: entries
                .iter()
                .map(|(n, k)| (n.to_string(), *k))
                .collect(),
        }
    }

    fn null_expr() -> TypeExpr {
        TypeExpr::Primitive(Primitive::Null)
    }

    #[test]
    fn fields_sorted_regardless_of_declaration_order() {
        let schema = record(
            "T",
            vec![
                field("zulu", TypeExpr::Primitive(Primitive::Long)),
                field("alpha", TypeExpr::Primitive(Primitive::String)),
            ],
        );
        let index = index_with(&[("T", TypeKind::Record)]);
        let desc = extract(&schema, &index).unwrap();
        let names: Vec<&str> = desc.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zulu"]);
    }

    #[test]
    fn required_iff_no_default() {
        let schema = record(
            "T",
            vec![
                field("a", TypeExpr::Primitive(Primitive::Long)),
                ParsedField {
                    name: "b".into(),
                    ty: TypeExpr::Primitive(Primitive::Long),
                    default: Some(json!(0)),
                },
            ],
        );
        let desc = extract(&schema, &index_with(&[])).unwrap();
        assert!(desc.is_required("a"));
        assert!(!desc.is_required("b"));
    }

    #[test]
    fn direct_record_reference_is_embedded() {
        let schema = record("T", vec![field("pos", TypeExpr::Named("Position".into()))]);
        let index = index_with(&[("Position", TypeKind::Record)]);
        let desc = extract(&schema, &index).unwrap();
        assert_eq!(desc.embedded_type("pos"), Some("Position"));
    }

    #[test]
    fn array_of_records_is_embedded() {
        let schema = record(
            "T",
            vec![field(
                "items",
                TypeExpr::Array(Box::new(TypeExpr::Named("Item".into()))),
            )],
        );
        let index = index_with(&[("Item", TypeKind::Record)]);
        let desc = extract(&schema, &index).unwrap();
        assert_eq!(desc.embedded_type("items"), Some("Item"));
    }

    #[test]
    fn nullable_record_embedded_with_null_first() {
        let schema = record(
            "T",
            vec![field(
                "opt",
                TypeExpr::Union(vec![null_expr(), TypeExpr::Named("Item".into())]),
            )],
        );
        let index = index_with(&[("Item", TypeKind::Record)]);
        let desc = extract(&schema, &index).unwrap();
        assert_eq!(desc.embedded_type("opt"), Some("Item"));
    }

    #[test]
    fn nullable_record_embedded_with_null_second() {
        // Order-independent null detection: a schema restructuring that
        // puts the record branch first still extracts cleanly.
        let schema = record(
            "T",
            vec![field(
                "opt",
                TypeExpr::Union(vec![TypeExpr::Named("Item".into()), null_expr()]),
            )],
        );
        let index = index_with(&[("Item", TypeKind::Record)]);
        let desc = extract(&schema, &index).unwrap();
        assert_eq!(desc.embedded_type("opt"), Some("Item"));
    }

    #[test]
    fn nullable_scalar_is_not_embedded() {
        let schema = record(
            "T",
            vec![field(
                "token",
                TypeExpr::Union(vec![null_expr(), TypeExpr::Primitive(Primitive::String)]),
            )],
        );
        let desc = extract(&schema, &index_with(&[])).unwrap();
        assert!(!desc.is_embedded("token"));
        assert_eq!(
            desc.field("token").unwrap().ty,
            FieldType::Nullable(Box::new(FieldType::String))
        );
    }

    #[test]
    fn enum_reference_is_not_embedded() {
        let schema = record("T", vec![field("op", TypeExpr::Named("Op".into()))]);
        let index = index_with(&[("Op", TypeKind::Enum)]);
        let desc = extract(&schema, &index).unwrap();
        assert!(!desc.is_embedded("op"));
        assert_eq!(desc.field("op").unwrap().ty, FieldType::Enum("Op".into()));
    }

    #[test]
    fn three_branch_union_rejected() {
        let schema = record(
            "T",
            vec![field(
                "u",
                TypeExpr::Union(vec![
                    null_expr(),
                    TypeExpr::Primitive(Primitive::String),
                    TypeExpr::Primitive(Primitive::Long),
                ]),
            )],
        );
        let result = extract(&schema, &index_with(&[]));
        assert!(matches!(
            result,
            Err(SchemaShapeError::UnsupportedUnion { .. })
        ));
    }

    #[test]
    fn union_without_null_branch_rejected() {
        let schema = record(
            "T",
            vec![field(
                "u",
                TypeExpr::Union(vec![
                    TypeExpr::Primitive(Primitive::String),
                    TypeExpr::Primitive(Primitive::Long),
                ]),
            )],
        );
        let result = extract(&schema, &index_with(&[]));
        assert!(matches!(
            result,
            Err(SchemaShapeError::UnsupportedUnion { detail, .. }) if detail == "no null branch"
        ));
    }

    #[test]
    fn unresolved_reference_rejected() {
        let schema = record("T", vec![field("x", TypeExpr::Named("Ghost".into()))]);
        let result = extract(&schema, &index_with(&[]));
        assert!(matches!(
            result,
            Err(SchemaShapeError::UnresolvedType { target, .. }) if target == "Ghost"
        ));
    }

    #[test]
    fn map_of_records_rejected() {
        let schema = record(
            "T",
            vec![field(
                "byName",
                TypeExpr::Map(Box::new(TypeExpr::Named("Item".into()))),
            )],
        );
        let index = index_with(&[("Item", TypeKind::Record)]);
        let result = extract(&schema, &index);
        assert!(matches!(result, Err(SchemaShapeError::MapOfRecords { .. })));
    }

    #[test]
    fn enum_symbols_preserved_in_declaration_order() {
        let schema = ParsedSchema {
            name: "Strand".into(),
            kind: ParsedKind::Enum {
                symbols: vec!["POS".into(), "NEG".into()],
            },
        };
        let desc = extract(&schema, &index_with(&[])).unwrap();
        assert_eq!(desc.symbols(), ["POS", "NEG"]);
    }
}
