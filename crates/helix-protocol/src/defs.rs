//! # Built-in Protocol Definitions
//!
//! Explicit, reflection-free registration of the shipped protocol
//! version: the descriptor for every record and enum reachable from the
//! search operations, the wire exception record, and the derived route
//! table. Nothing here is generated — descriptors are ordinary data
//! built through the same constructors the schema compiler uses, so
//! both paths share one set of derivation rules.
//!
//! The registry is populated once on first use and lives for the
//! remainder of the process; all runtime traversals borrow it.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::descriptor::{FieldDescriptor, FieldType, TypeDescriptor};
use crate::registry::ProtocolRegistry;

/// The protocol version the built-in definitions implement.
pub const PROTOCOL_VERSION: &str = "0.5.1";

/// Named constants for the `CigarOperation` enum; each symbol's value
/// is its own name, forming a closed string-backed enumeration.
pub mod cigar_operation {
    pub const ALIGNMENT_MATCH: &str = "ALIGNMENT_MATCH";
    pub const INSERT: &str = "INSERT";
    pub const DELETE: &str = "DELETE";
    pub const SKIP: &str = "SKIP";
    pub const CLIP_SOFT: &str = "CLIP_SOFT";
    pub const CLIP_HARD: &str = "CLIP_HARD";
    pub const PAD: &str = "PAD";
    pub const SEQUENCE_MATCH: &str = "SEQUENCE_MATCH";
    pub const SEQUENCE_MISMATCH: &str = "SEQUENCE_MISMATCH";

    /// All symbols, in declaration order.
    pub const SYMBOLS: [&str; 9] = [
        ALIGNMENT_MATCH,
        INSERT,
        DELETE,
        SKIP,
        CLIP_SOFT,
        CLIP_HARD,
        PAD,
        SEQUENCE_MATCH,
        SEQUENCE_MISMATCH,
    ];
}

fn nullable(inner: FieldType) -> FieldType {
    FieldType::Nullable(Box::new(inner))
}

fn array(inner: FieldType) -> FieldType {
    FieldType::Array(Box::new(inner))
}

fn record_ref(name: &str) -> FieldType {
    FieldType::Record(name.to_string())
}

fn opt(name: &str, inner: FieldType) -> FieldDescriptor {
    FieldDescriptor::with_default(name, nullable(inner), Value::Null)
}

/// The full descriptor set for [`PROTOCOL_VERSION`].
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        position(),
        cigar_operation_enum(),
        cigar_unit(),
        linear_alignment(),
        read_alignment(),
        search_reads_request(),
        search_reads_response(),
        call_set(),
        search_call_sets_request(),
        search_call_sets_response(),
        service_exception(),
    ]
}

/// The built-in registry, assembled once per process.
pub fn registry() -> &'static ProtocolRegistry {
    static REGISTRY: OnceLock<ProtocolRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        // The built-in set is closed and covered by tests; a build
        // failure here is a defect in this module, not in input data.
        ProtocolRegistry::build(PROTOCOL_VERSION, descriptors())
            .unwrap_or_else(|e| panic!("built-in protocol definitions are inconsistent: {e}"))
    })
}

fn position() -> TypeDescriptor {
    TypeDescriptor::record(
        "Position",
        vec![
            FieldDescriptor::required("referenceName", FieldType::String),
            FieldDescriptor::required("position", FieldType::Long),
            FieldDescriptor::with_default("reverseStrand", FieldType::Boolean, json!(false)),
        ],
    )
}

fn cigar_operation_enum() -> TypeDescriptor {
    TypeDescriptor::enumeration(
        "CigarOperation",
        cigar_operation::SYMBOLS.iter().map(|s| s.to_string()).collect(),
    )
}

fn cigar_unit() -> TypeDescriptor {
    TypeDescriptor::record(
        "CigarUnit",
        vec![
            FieldDescriptor::required("operation", FieldType::Enum("CigarOperation".into())),
            FieldDescriptor::required("operationLength", FieldType::Long),
            opt("referenceSequence", FieldType::String),
        ],
    )
}

fn linear_alignment() -> TypeDescriptor {
    TypeDescriptor::record(
        "LinearAlignment",
        vec![
            FieldDescriptor::required("position", record_ref("Position")),
            opt("mappingQuality", FieldType::Int),
            FieldDescriptor::with_default("cigar", array(record_ref("CigarUnit")), json!([])),
        ],
    )
}

fn read_alignment() -> TypeDescriptor {
    TypeDescriptor::record(
        "ReadAlignment",
        vec![
            opt("id", FieldType::String),
            FieldDescriptor::required("readGroupId", FieldType::String),
            FieldDescriptor::required("fragmentName", FieldType::String),
            FieldDescriptor::with_default("properPlacement", FieldType::Boolean, json!(false)),
            FieldDescriptor::with_default("duplicateFragment", FieldType::Boolean, json!(false)),
            opt("numberReads", FieldType::Int),
            opt("fragmentLength", FieldType::Int),
            opt("readNumber", FieldType::Int),
            FieldDescriptor::with_default(
                "failedVendorQualityChecks",
                FieldType::Boolean,
                json!(false),
            ),
            opt("alignment", record_ref("LinearAlignment")),
            FieldDescriptor::with_default("secondaryAlignment", FieldType::Boolean, json!(false)),
            FieldDescriptor::with_default(
                "supplementaryAlignment",
                FieldType::Boolean,
                json!(false),
            ),
            opt("alignedSequence", FieldType::String),
            FieldDescriptor::with_default("alignedQuality", array(FieldType::Int), json!([])),
            opt("nextMatePosition", record_ref("Position")),
            FieldDescriptor::with_default(
                "info",
                FieldType::Map(Box::new(array(FieldType::String))),
                json!({}),
            ),
        ],
    )
}

fn search_reads_request() -> TypeDescriptor {
    TypeDescriptor::record(
        "SearchReadsRequest",
        vec![
            FieldDescriptor::with_default("readGroupIds", array(FieldType::String), json!([])),
            opt("referenceName", FieldType::String),
            opt("referenceId", FieldType::String),
            FieldDescriptor::with_default("start", FieldType::Long, json!(0)),
            opt("end", FieldType::Long),
            opt("pageSize", FieldType::Int),
            opt("pageToken", FieldType::String),
        ],
    )
}

fn search_reads_response() -> TypeDescriptor {
    TypeDescriptor::record(
        "SearchReadsResponse",
        vec![
            FieldDescriptor::with_default("alignments", array(record_ref("ReadAlignment")), json!([])),
            opt("nextPageToken", FieldType::String),
        ],
    )
}

fn call_set() -> TypeDescriptor {
    TypeDescriptor::record(
        "CallSet",
        vec![
            FieldDescriptor::required("id", FieldType::String),
            opt("name", FieldType::String),
            opt("sampleId", FieldType::String),
            FieldDescriptor::with_default("variantSetIds", array(FieldType::String), json!([])),
            opt("created", FieldType::Long),
            opt("updated", FieldType::Long),
            FieldDescriptor::with_default(
                "info",
                FieldType::Map(Box::new(array(FieldType::String))),
                json!({}),
            ),
        ],
    )
}

fn search_call_sets_request() -> TypeDescriptor {
    TypeDescriptor::record(
        "SearchCallSetsRequest",
        vec![
            FieldDescriptor::with_default("variantSetIds", array(FieldType::String), json!([])),
            opt("name", FieldType::String),
            opt("pageSize", FieldType::Int),
            opt("pageToken", FieldType::String),
        ],
    )
}

fn search_call_sets_response() -> TypeDescriptor {
    TypeDescriptor::record(
        "SearchCallSetsResponse",
        vec![
            FieldDescriptor::with_default("callSets", array(record_ref("CallSet")), json!([])),
            opt("nextPageToken", FieldType::String),
        ],
    )
}

/// The wire error record: every error envelope sent to a caller must
/// itself be a valid instance of this type.
fn service_exception() -> TypeDescriptor {
    TypeDescriptor::record(
        "ServiceException",
        vec![
            FieldDescriptor::required("code", FieldType::Int),
            FieldDescriptor::required("message", FieldType::String),
        ],
    )
}
