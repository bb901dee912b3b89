//! # helix-api — Service Boundary
//!
//! The HTTP-facing layer over `helix-protocol`: a structured error
//! taxonomy with stable numeric codes and status mapping, the
//! `{code, message}` wire envelope, boundary configuration, and the
//! validation-gated marshaling helpers that handlers call on the way
//! in and out.
//!
//! ## Error contract
//!
//! Every error response body is a valid `ServiceException` protocol
//! instance. Client faults report 400/404, server faults 500,
//! unimplemented operations 501. Errors that were never mapped to the
//! taxonomy are logged server-side and collapsed to the fixed
//! catch-all message, so internal details never appear on the wire.

pub mod boundary;
pub mod config;
pub mod error;

// Re-export primary types for ergonomic imports.
pub use boundary::{decode_request, encode_response};
pub use config::{ServiceConfig, DEFAULT_MAX_CONTENT_LENGTH};
pub use error::{handle_error, ErrorEnvelope, ErrorKind, ServiceError, SERVER_ERROR_MESSAGE};
