//! # Protocol Registry
//!
//! The closed descriptor set for one protocol version, plus the derived
//! table of search routes. Built once at process startup (or by the
//! schema compiler) and treated as immutable for the rest of the process
//! lifetime; every runtime traversal borrows it read-only.
//!
//! Building a registry is the data-driven replacement for emitting
//! per-type source code: cross-references between descriptors are
//! resolved here, and any dangling or mis-kinded reference is fatal —
//! no partial registry is ever produced.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::descriptor::{FieldType, TypeDescriptor, TypeKind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while assembling a registry from extracted descriptors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Two descriptors share a type name.
    #[error("duplicate type name: {0}")]
    DuplicateType(String),

    /// A field references a type name that is not in the set.
    #[error("{record}.{field} references unknown type {target}")]
    UnresolvedReference {
        /// The record declaring the field.
        record: String,
        /// The referencing field.
        field: String,
        /// The missing type name.
        target: String,
    },

    /// A field references an existing type of the wrong kind, e.g. a
    /// record reference that resolves to an enum.
    #[error("{record}.{field} references {target} as a {expected:?}, but it is a {actual:?}")]
    KindMismatch {
        /// The record declaring the field.
        record: String,
        /// The referencing field.
        field: String,
        /// The referenced type name.
        target: String,
        /// The kind the field declaration requires.
        expected: TypeKind,
        /// The kind the referenced descriptor actually has.
        actual: TypeKind,
    },

    /// A `Search<X>Request` without a `Search<X>Response`, or the
    /// reverse. Requests and responses are joined on the `<X>` substring,
    /// so an unpaired side means the schema set is incomplete.
    #[error("search type {0} has no matching counterpart")]
    UnpairedRoute(String),
}

// ---------------------------------------------------------------------------
// Route descriptors
// ---------------------------------------------------------------------------

/// One derived search route: the wire path a dispatch layer should
/// accept POSTs on, and the request/response type names it marshals.
/// Never mutated after derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// The wire path, `/<x lowercased>/search`.
    pub path: String,
    /// The `Search<X>Request` type name.
    pub request: String,
    /// The `Search<X>Response` type name.
    pub response: String,
}

/// The `<X>` of a `Search<X>Request` / `Search<X>Response` name, if the
/// name has that shape with a non-empty `<X>`.
fn search_stem<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix("Search")?;
    let stem = rest.strip_suffix(suffix)?;
    (!stem.is_empty()).then_some(stem)
}

// ---------------------------------------------------------------------------
// ProtocolRegistry
// ---------------------------------------------------------------------------

/// The immutable descriptor set for one protocol version.
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    version: String,
    types: BTreeMap<String, TypeDescriptor>,
    routes: Vec<RouteDescriptor>,
}

impl ProtocolRegistry {
    /// Assemble a registry from the full descriptor set of a version.
    ///
    /// Checks that type names are unique and that every record, enum,
    /// and nullable-record reference resolves to a descriptor of the
    /// right kind, then derives the search route table. Any failure
    /// aborts the build; there is no partial output.
    pub fn build(
        version: impl Into<String>,
        descriptors: Vec<TypeDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut types: BTreeMap<String, TypeDescriptor> = BTreeMap::new();
        for desc in descriptors {
            if types.contains_key(desc.name()) {
                return Err(RegistryError::DuplicateType(desc.name().to_string()));
            }
            types.insert(desc.name().to_string(), desc);
        }

        for desc in types.values() {
            for field in desc.fields() {
                check_references(desc.name(), &field.name, &field.ty, &types)?;
            }
        }

        let routes = derive_routes(&types)?;
        let version = version.into();
        tracing::debug!(
            version = %version,
            types = types.len(),
            routes = routes.len(),
            "protocol registry assembled"
        );
        Ok(Self {
            version,
            types,
            routes,
        })
    }

    /// The protocol version string this registry was built for.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up one type descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// All descriptors, in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of registered types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// The derived search route table, sorted by path.
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }
}

/// Walk one field type and verify every named reference resolves to a
/// descriptor of the expected kind.
fn check_references(
    record: &str,
    field: &str,
    ty: &FieldType,
    types: &BTreeMap<String, TypeDescriptor>,
) -> Result<(), RegistryError> {
    let check = |target: &str, expected: TypeKind| -> Result<(), RegistryError> {
        let Some(found) = types.get(target) else {
            return Err(RegistryError::UnresolvedReference {
                record: record.to_string(),
                field: field.to_string(),
                target: target.to_string(),
            });
        };
        if found.kind() != expected {
            return Err(RegistryError::KindMismatch {
                record: record.to_string(),
                field: field.to_string(),
                target: target.to_string(),
                expected,
                actual: found.kind(),
            });
        }
        Ok(())
    };
    match ty {
        FieldType::Record(name) => check(name, TypeKind::Record),
        FieldType::Enum(name) => check(name, TypeKind::Enum),
        FieldType::Array(inner) | FieldType::Map(inner) | FieldType::Nullable(inner) => {
            check_references(record, field, inner, types)
        }
        _ => Ok(()),
    }
}

/// Join `Search<X>Request` and `Search<X>Response` record names on the
/// `<X>` substring and derive one wire path per pair.
///
/// The join is keyed, not positional: request/response declaration order
/// does not matter, and a search type whose counterpart is missing fails
/// the build instead of silently pairing with a neighbour.
fn derive_routes(
    types: &BTreeMap<String, TypeDescriptor>,
) -> Result<Vec<RouteDescriptor>, RegistryError> {
    let mut requests: BTreeMap<&str, &str> = BTreeMap::new();
    let mut responses: BTreeMap<&str, &str> = BTreeMap::new();
    for desc in types.values() {
        if desc.kind() != TypeKind::Record {
            continue;
        }
        if let Some(stem) = search_stem(desc.name(), "Request") {
            requests.insert(stem, desc.name());
        } else if let Some(stem) = search_stem(desc.name(), "Response") {
            responses.insert(stem, desc.name());
        }
    }

    let mut routes = Vec::with_capacity(requests.len());
    for (stem, request) in &requests {
        let Some(response) = responses.get(stem) else {
            return Err(RegistryError::UnpairedRoute((*request).to_string()));
        };
        routes.push(RouteDescriptor {
            path: format!("/{}/search", stem.to_lowercase()),
            request: (*request).to_string(),
            response: (*response).to_string(),
        });
    }
    for (stem, response) in &responses {
        if !requests.contains_key(stem) {
            return Err(RegistryError::UnpairedRoute((*response).to_string()));
        }
    }
    routes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    fn record(name: &str, fields: Vec<FieldDescriptor>) -> TypeDescriptor {
        TypeDescriptor::record(name, fields)
    }

    #[test]
    fn build_resolves_references() {
        let registry = ProtocolRegistry::build(
            "0.0.1",
            vec![
                record("Leaf", vec![FieldDescriptor::required("x", FieldType::Long)]),
                record(
                    "Root",
                    vec![FieldDescriptor::required(
                        "leaf",
                        FieldType::Record("Leaf".into()),
                    )],
                ),
            ],
        )
        .expect("registry should build");
        assert_eq!(registry.type_count(), 2);
        assert_eq!(registry.version(), "0.0.1");
        assert!(registry.descriptor("Leaf").is_some());
        assert!(registry.descriptor("Missing").is_none());
    }

    #[test]
    fn duplicate_type_rejected() {
        let result = ProtocolRegistry::build(
            "0.0.1",
            vec![record("Dup", Vec::new()), record("Dup", Vec::new())],
        );
        assert!(matches!(result, Err(RegistryError::DuplicateType(name)) if name == "Dup"));
    }

    #[test]
    fn dangling_reference_rejected() {
        let result = ProtocolRegistry::build(
            "0.0.1",
            vec![record(
                "Root",
                vec![FieldDescriptor::required(
                    "leaf",
                    FieldType::Record("Nowhere".into()),
                )],
            )],
        );
        assert!(matches!(
            result,
            Err(RegistryError::UnresolvedReference { target, .. }) if target == "Nowhere"
        ));
    }

    #[test]
    fn nested_reference_inside_array_checked() {
        let result = ProtocolRegistry::build(
            "0.0.1",
            vec![record(
                "Root",
                vec![FieldDescriptor::required(
                    "items",
                    FieldType::Array(Box::new(FieldType::Record("Nowhere".into()))),
                )],
            )],
        );
        assert!(matches!(
            result,
            Err(RegistryError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn record_reference_to_enum_is_kind_mismatch() {
        let result = ProtocolRegistry::build(
            "0.0.1",
            vec![
                TypeDescriptor::enumeration("Op", vec!["A".into()]),
                record(
                    "Root",
                    vec![FieldDescriptor::required(
                        "op",
                        FieldType::Record("Op".into()),
                    )],
                ),
            ],
        );
        assert!(matches!(result, Err(RegistryError::KindMismatch { .. })));
    }

    #[test]
    fn routes_joined_by_stem_not_position() {
        // Declaration order deliberately interleaved: the BTreeMap walk
        // visits SearchAlphaResponse before SearchBetaRequest, which a
        // positional zip would mispair.
        let registry = ProtocolRegistry::build(
            "0.0.1",
            vec![
                record("SearchBetaRequest", Vec::new()),
                record("SearchAlphaResponse", Vec::new()),
                record("SearchBetaResponse", Vec::new()),
                record("SearchAlphaRequest", Vec::new()),
            ],
        )
        .expect("registry should build");
        assert_eq!(
            registry.routes(),
            &[
                RouteDescriptor {
                    path: "/alpha/search".into(),
                    request: "SearchAlphaRequest".into(),
                    response: "SearchAlphaResponse".into(),
                },
                RouteDescriptor {
                    path: "/beta/search".into(),
                    request: "SearchBetaRequest".into(),
                    response: "SearchBetaResponse".into(),
                },
            ]
        );
    }

    #[test]
    fn unpaired_request_fails_build() {
        let result = ProtocolRegistry::build("0.0.1", vec![record("SearchReadsRequest", Vec::new())]);
        assert!(matches!(
            result,
            Err(RegistryError::UnpairedRoute(name)) if name == "SearchReadsRequest"
        ));
    }

    #[test]
    fn unpaired_response_fails_build() {
        let result =
            ProtocolRegistry::build("0.0.1", vec![record("SearchReadsResponse", Vec::new())]);
        assert!(matches!(result, Err(RegistryError::UnpairedRoute(_))));
    }

    #[test]
    fn non_search_names_do_not_route() {
        let registry = ProtocolRegistry::build(
            "0.0.1",
            vec![
                record("ReadAlignment", Vec::new()),
                record("Searcher", Vec::new()),
                record("SearchRequest", Vec::new()),
            ],
        )
        .expect("registry should build");
        assert!(registry.routes().is_empty());
    }
}
