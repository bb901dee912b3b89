//! # Version Compiler
//!
//! The one-shot, single-threaded batch pipeline: load every schema
//! definition file in a version directory, extract a descriptor from
//! each, and assemble the protocol registry. Any failure at any stage
//! is fatal to the run — no partial registry is ever produced.

use std::path::Path;

use thiserror::Error;

use helix_protocol::{ProtocolRegistry, RegistryError};

use crate::extract::{extract, SchemaShapeError, TypeIndex};
use crate::source::{load_dir, version_from_dir, SchemaParseError};

/// Any failure of a compilation run.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A schema file failed to load or parse.
    #[error(transparent)]
    Parse(#[from] SchemaParseError),

    /// A schema used an unsupported or unresolvable construct.
    #[error(transparent)]
    Shape(#[from] SchemaShapeError),

    /// The extracted descriptors did not assemble into a registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Compile one protocol version directory into a registry, deriving
/// the version string from the directory name (`v0.5.1` → `0.5.1`).
pub fn compile_dir(dir: &Path) -> Result<ProtocolRegistry, CompileError> {
    let version = version_from_dir(dir);
    compile_dir_with_version(dir, &version)
}

/// Compile one protocol version directory under an explicit version
/// string.
pub fn compile_dir_with_version(
    dir: &Path,
    version: &str,
) -> Result<ProtocolRegistry, CompileError> {
    let schemas = load_dir(dir)?;
    let index = TypeIndex::from_schemas(&schemas);

    let mut descriptors = Vec::with_capacity(schemas.len());
    for schema in &schemas {
        let descriptor = extract(schema, &index)?;
        tracing::debug!(name = descriptor.name(), "extracted type descriptor");
        descriptors.push(descriptor);
    }

    let registry = ProtocolRegistry::build(version, descriptors)?;
    tracing::info!(
        version,
        types = registry.type_count(),
        routes = registry.routes().len(),
        dir = %dir.display(),
        "compiled protocol version"
    );
    Ok(registry)
}
