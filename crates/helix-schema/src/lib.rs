//! # helix-schema — Schema Compiler
//!
//! Compiles declarative schema definition files (records with named,
//! possibly-optional fields; enums with fixed symbol sets; nullable
//! unions of records) into the runtime descriptor registry that
//! `helix-protocol` marshals and validates against.
//!
//! ## Pipeline
//!
//! 1. [`source::load_dir`] parses one version's `*.avsc` files into
//!    abstract schema descriptions (sorted, inline definitions hoisted);
//! 2. [`extract::extract`] lowers each description into a
//!    [`helix_protocol::TypeDescriptor`], resolving references and
//!    folding `{null, T}` unions into the canonical nullable form;
//! 3. [`compile::compile_dir`] assembles the registry, deriving the
//!    search route table and cross-checking every type reference.
//!
//! The pipeline is a one-shot batch process; every failure is fatal and
//! yields no partial output.

pub mod compile;
pub mod extract;
pub mod source;

// Re-export primary types for ergonomic imports.
pub use compile::{compile_dir, compile_dir_with_version, CompileError};
pub use extract::{extract, SchemaShapeError, TypeIndex};
pub use source::{
    load_dir, parse_file, version_from_dir, ParsedField, ParsedKind, ParsedSchema, Primitive,
    SchemaParseError, TypeExpr,
};
