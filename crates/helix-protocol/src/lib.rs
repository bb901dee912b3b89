//! # helix-protocol — Protocol Descriptors & Runtime Object Model
//!
//! The strongly-shaped runtime layer of the Helix search protocol.
//! Type descriptors ([`TypeDescriptor`]) are plain data describing one
//! record or enum: its name-sorted field set, defaults, required
//! fields, and the embedded-type map. The runtime object model is a
//! generic engine over those descriptors:
//!
//! - [`ProtocolObject`] — a closed-attribute instance of one record;
//! - [`marshal::to_json_dict`] / [`marshal::from_json_dict`] — generic
//!   JSON traversal driven by the embedded-type map (lenient on input);
//! - [`validate::validate`] — strict one-pass shape checking that
//!   collects every violation into a [`ValidationReport`].
//!
//! [`defs`] registers the shipped protocol version explicitly; the
//! schema compiler in `helix-schema` builds the same structures from
//! schema definition files.

pub mod defs;
pub mod descriptor;
pub mod marshal;
pub mod object;
pub mod registry;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use descriptor::{FieldDescriptor, FieldType, TypeDescriptor, TypeKind};
pub use marshal::{from_json_dict, to_json_dict};
pub use object::{FieldValue, ObjectError, ProtocolObject};
pub use registry::{ProtocolRegistry, RegistryError, RouteDescriptor};
pub use validate::{json_repr, validate, ValidationReport};
