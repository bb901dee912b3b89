//! # Schema Source Loader
//!
//! Reads the schema definition files for one protocol version — a
//! directory of `*.avsc` JSON documents — and parses each into an
//! abstract schema description. This is purely a parse step: no I/O
//! happens beyond reading the given directory, and a malformed or
//! unsupported file fails the whole load with no partial output.
//!
//! Directory iteration order is not deterministic, so file paths are
//! sorted before parsing and the resulting schema list is sorted by
//! type name; everything derived downstream is stable across runs.
//!
//! Inline nested record/enum definitions are hoisted into their own
//! [`ParsedSchema`] and replaced by a named reference, so one file may
//! yield several schemas.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading and parsing schema definition files.
#[derive(Error, Debug)]
pub enum SchemaParseError {
    /// The schema directory or a file in it could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A schema file is not valid JSON.
    #[error("{path} is not valid JSON: {reason}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// A schema document is missing a required attribute, or an
    /// attribute has the wrong JSON shape.
    #[error("malformed schema in {path}: {detail}")]
    Malformed {
        /// The offending file.
        path: PathBuf,
        /// What was wrong.
        detail: String,
    },

    /// A top-level document whose `type` is neither `record` nor `enum`.
    #[error("{path}: unsupported top-level schema type {kind:?}")]
    UnsupportedTopLevel {
        /// The offending file.
        path: PathBuf,
        /// The declared type keyword.
        kind: String,
    },

    /// The same type name was defined twice across the version's files.
    #[error("type {0} is defined more than once")]
    DuplicateName(String),
}

// ---------------------------------------------------------------------------
// Parsed schema model
// ---------------------------------------------------------------------------

/// The primitive type keywords of the schema language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl Primitive {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "null" => Primitive::Null,
            "boolean" => Primitive::Boolean,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "bytes" => Primitive::Bytes,
            "string" => Primitive::String,
            _ => return None,
        })
    }
}

/// The raw type AST of one field declaration, before extraction
/// resolves names and folds unions into the canonical nullable form.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Primitive(Primitive),
    /// A reference to another type, by name.
    Named(String),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    /// A union, branches in declaration order.
    Union(Vec<TypeExpr>),
}

/// One parsed field: name, raw type, and default-presence. A declared
/// default of `null` is still a declared default — the distinction is
/// what makes a field required or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedField {
    pub name: String,
    pub ty: TypeExpr,
    pub default: Option<Value>,
}

/// The shape of one parsed schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedKind {
    Record { fields: Vec<ParsedField> },
    Enum { symbols: Vec<String> },
}

/// One abstract schema description, as parsed from a definition file
/// (or hoisted out of an inline definition).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSchema {
    pub name: String,
    pub kind: ParsedKind,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and parse every `*.avsc` file in one version directory.
///
/// Returns the parsed schemas sorted by type name, inline definitions
/// included. Fails on the first malformed file, unsupported construct,
/// or duplicate type name — a generation run never continues past a
/// broken schema set.
pub fn load_dir(dir: &Path) -> Result<Vec<ParsedSchema>, SchemaParseError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SchemaParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SchemaParseError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "avsc") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut schemas = Vec::new();
    for path in &paths {
        let parsed = parse_file(path)?;
        tracing::debug!(path = %path.display(), count = parsed.len(), "parsed schema file");
        schemas.extend(parsed);
    }

    let mut seen = BTreeSet::new();
    for schema in &schemas {
        if !seen.insert(schema.name.clone()) {
            return Err(SchemaParseError::DuplicateName(schema.name.clone()));
        }
    }

    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(schemas)
}

/// Parse one schema definition file. The first schema returned is the
/// file's top-level type; any further entries are hoisted inline
/// definitions.
pub fn parse_file(path: &Path) -> Result<Vec<ParsedSchema>, SchemaParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&content).map_err(|e| SchemaParseError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut hoisted = Vec::new();
    let top = parse_definition(&document, path, &mut hoisted)?;
    let mut schemas = vec![top];
    schemas.append(&mut hoisted);
    Ok(schemas)
}

/// The protocol version encoded in a directory name, with one leading
/// `v` stripped (`v0.5.1` → `0.5.1`).
pub fn version_from_dir(dir: &Path) -> String {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.strip_prefix('v').unwrap_or(name).to_string()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn malformed(path: &Path, detail: impl Into<String>) -> SchemaParseError {
    SchemaParseError::Malformed {
        path: path.to_path_buf(),
        detail: detail.into(),
    }
}

/// Parse a record or enum definition object into a [`ParsedSchema`],
/// hoisting any inline definitions found in its fields.
fn parse_definition(
    value: &Value,
    path: &Path,
    hoisted: &mut Vec<ParsedSchema>,
) -> Result<ParsedSchema, SchemaParseError> {
    let map = value
        .as_object()
        .ok_or_else(|| malformed(path, "definition is not a JSON object"))?;
    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(path, "definition has no \"type\" keyword"))?;
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(path, "definition has no \"name\""))?
        .to_string();

    match kind {
        "record" => {
            let raw_fields = map
                .get("fields")
                .and_then(Value::as_array)
                .ok_or_else(|| malformed(path, format!("record {name} has no \"fields\" array")))?;
            let mut fields = Vec::with_capacity(raw_fields.len());
            for raw in raw_fields {
                fields.push(parse_field(raw, path, hoisted)?);
            }
            Ok(ParsedSchema {
                name,
                kind: ParsedKind::Record { fields },
            })
        }
        "enum" => {
            let raw_symbols = map
                .get("symbols")
                .and_then(Value::as_array)
                .ok_or_else(|| malformed(path, format!("enum {name} has no \"symbols\" array")))?;
            let mut symbols = Vec::with_capacity(raw_symbols.len());
            for raw in raw_symbols {
                let symbol = raw
                    .as_str()
                    .ok_or_else(|| malformed(path, format!("enum {name} has a non-string symbol")))?;
                symbols.push(symbol.to_string());
            }
            Ok(ParsedSchema {
                name,
                kind: ParsedKind::Enum { symbols },
            })
        }
        other => Err(SchemaParseError::UnsupportedTopLevel {
            path: path.to_path_buf(),
            kind: other.to_string(),
        }),
    }
}

fn parse_field(
    value: &Value,
    path: &Path,
    hoisted: &mut Vec<ParsedSchema>,
) -> Result<ParsedField, SchemaParseError> {
    let map = value
        .as_object()
        .ok_or_else(|| malformed(path, "field declaration is not a JSON object"))?;
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(path, "field declaration has no \"name\""))?
        .to_string();
    let ty_value = map
        .get("type")
        .ok_or_else(|| malformed(path, format!("field {name} has no \"type\"")))?;
    let ty = parse_type_expr(ty_value, path, hoisted)?;
    // Presence is what matters: a declared default of null still makes
    // the field optional.
    let default = map.get("default").cloned();
    Ok(ParsedField { name, ty, default })
}

/// Parse one type expression, hoisting inline record/enum definitions.
fn parse_type_expr(
    value: &Value,
    path: &Path,
    hoisted: &mut Vec<ParsedSchema>,
) -> Result<TypeExpr, SchemaParseError> {
    match value {
        Value::String(keyword) => Ok(match Primitive::from_keyword(keyword) {
            Some(primitive) => TypeExpr::Primitive(primitive),
            None => TypeExpr::Named(keyword.clone()),
        }),
        Value::Array(branches) => {
            let mut parsed = Vec::with_capacity(branches.len());
            for branch in branches {
                parsed.push(parse_type_expr(branch, path, hoisted)?);
            }
            Ok(TypeExpr::Union(parsed))
        }
        Value::Object(map) => {
            let kind = map
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(path, "type object has no \"type\" keyword"))?;
            match kind {
                "array" => {
                    let items = map
                        .get("items")
                        .ok_or_else(|| malformed(path, "array type has no \"items\""))?;
                    Ok(TypeExpr::Array(Box::new(parse_type_expr(
                        items, path, hoisted,
                    )?)))
                }
                "map" => {
                    let values = map
                        .get("values")
                        .ok_or_else(|| malformed(path, "map type has no \"values\""))?;
                    Ok(TypeExpr::Map(Box::new(parse_type_expr(
                        values, path, hoisted,
                    )?)))
                }
                "record" | "enum" => {
                    // Inline definition: hoist it and refer by name.
                    let inline = parse_definition(value, path, hoisted)?;
                    let name = inline.name.clone();
                    hoisted.push(inline);
                    Ok(TypeExpr::Named(name))
                }
                keyword => match Primitive::from_keyword(keyword) {
                    Some(primitive) => Ok(TypeExpr::Primitive(primitive)),
                    None => Err(malformed(
                        path,
                        format!("unsupported type keyword {keyword:?}"),
                    )),
                },
            }
        }
        other => Err(malformed(path, format!("unparseable type: {other}"))),
    }
}
