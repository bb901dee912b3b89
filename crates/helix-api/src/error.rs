//! # Service Error Taxonomy
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every error carries a stable numeric code and maps to an HTTP status;
//! the wire body is always the two-field `{code, message}` envelope,
//! which is itself a valid `ServiceException` protocol instance.
//! Unrecognized internal errors are logged and collapsed to a fixed
//! message so their details never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use helix_protocol::{json_repr, validate, ProtocolRegistry, TypeDescriptor, ValidationReport};

/// Message returned for any server-side fault whose details must not
/// reach the client.
pub const SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

// ---------------------------------------------------------------------------
// Error kinds: stable codes and status mapping
// ---------------------------------------------------------------------------

/// Every error condition the service can report, with its stable wire
/// code. Codes are part of the protocol: once assigned they never
/// change meaning, and no two kinds share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ServerError,
    ObjectNotFound,
    ObjectNotFoundById,
    CallSetNotInVariantSet,
    RequestValidationFailure,
    ResponseValidationFailure,
    NotImplemented,
}

impl ErrorKind {
    /// Every kind, for exhaustive checks over the code space.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::ServerError,
        ErrorKind::ObjectNotFound,
        ErrorKind::ObjectNotFoundById,
        ErrorKind::CallSetNotInVariantSet,
        ErrorKind::RequestValidationFailure,
        ErrorKind::ResponseValidationFailure,
        ErrorKind::NotImplemented,
    ];

    /// The stable numeric code sent in the error envelope.
    pub fn code(self) -> u32 {
        match self {
            Self::ServerError => 0,
            Self::ObjectNotFound => 1,
            Self::ObjectNotFoundById => 2,
            Self::CallSetNotInVariantSet => 3,
            Self::RequestValidationFailure => 4,
            Self::ResponseValidationFailure => 5,
            Self::NotImplemented => 6,
        }
    }

    /// The HTTP status this kind maps to. A response that fails
    /// validation is the server's fault, so it reports 500, not 400.
    pub fn status(self) -> StatusCode {
        match self {
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ObjectNotFound => StatusCode::NOT_FOUND,
            Self::ObjectNotFoundById => StatusCode::NOT_FOUND,
            Self::CallSetNotInVariantSet => StatusCode::NOT_FOUND,
            Self::RequestValidationFailure => StatusCode::BAD_REQUEST,
            Self::ResponseValidationFailure => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

// ---------------------------------------------------------------------------
// Service errors
// ---------------------------------------------------------------------------

/// Application-level error type that implements [`IntoResponse`] for
/// Axum.
///
/// Each variant corresponds to one [`ErrorKind`]; the `Display` text is
/// the client-facing message. Validation failures echo the offending
/// payload and the full violation report so a client can see every
/// problem at once.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Catch-all server fault (500). Whatever caused it is logged at
    /// the boundary; the client only ever sees the fixed message.
    #[error("{}", SERVER_ERROR_MESSAGE)]
    ServerError,

    /// A requested object does not exist (404).
    #[error("The object requested was not found")]
    ObjectNotFound,

    /// No object with the given id exists (404).
    #[error("No object of this type exists with id '{id}'")]
    ObjectNotFoundById { id: String },

    /// A call set exists but is not part of the named variant set (404).
    #[error("CallSet '{call_set_id}' is not in VariantSet '{variant_set_id}'")]
    CallSetNotInVariantSet {
        call_set_id: String,
        variant_set_id: String,
    },

    /// The client's request body is not a valid instance of the
    /// expected request type (400).
    #[error(
        "Request {} is not a valid instance of {type_name}; invalid fields: {report}",
        json_repr(.body)
    )]
    RequestValidationFailure {
        body: Value,
        type_name: String,
        report: ValidationReport,
    },

    /// The body the server was about to send is not a valid instance
    /// of the declared response type (500).
    #[error(
        "Response {} is not a valid instance of {type_name}. Invalid fields: {report}",
        json_repr(.body)
    )]
    ResponseValidationFailure {
        body: Value,
        type_name: String,
        report: ValidationReport,
    },

    /// The operation exists in the protocol but this server does not
    /// implement it (501).
    #[error("{0}")]
    NotImplemented(String),
}

impl ServiceError {
    /// The kind (and therefore code and status) of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServerError => ErrorKind::ServerError,
            Self::ObjectNotFound => ErrorKind::ObjectNotFound,
            Self::ObjectNotFoundById { .. } => ErrorKind::ObjectNotFoundById,
            Self::CallSetNotInVariantSet { .. } => ErrorKind::CallSetNotInVariantSet,
            Self::RequestValidationFailure { .. } => ErrorKind::RequestValidationFailure,
            Self::ResponseValidationFailure { .. } => ErrorKind::ResponseValidationFailure,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Validate a request body and build the failure carrying the full
    /// violation report. The caller checks `report.is_valid()` first;
    /// calling this on a valid body produces an error with an empty
    /// report.
    pub fn request_validation(
        body: &Value,
        descriptor: &TypeDescriptor,
        registry: &ProtocolRegistry,
    ) -> Self {
        let report = validate(body, descriptor, registry);
        Self::RequestValidationFailure {
            body: body.clone(),
            type_name: descriptor.name().to_string(),
            report,
        }
    }

    /// Validate an outbound response body and build the failure
    /// carrying the full violation report.
    pub fn response_validation(
        body: &Value,
        descriptor: &TypeDescriptor,
        registry: &ProtocolRegistry,
    ) -> Self {
        let report = validate(body, descriptor, registry);
        Self::ResponseValidationFailure {
            body: body.clone(),
            type_name: descriptor.name().to_string(),
            report,
        }
    }

    /// Construct a not-implemented error for a named operation (501).
    pub fn not_implemented(operation: &str) -> Self {
        Self::NotImplemented(format!("Operation '{operation}' is not implemented"))
    }

    /// The wire envelope for this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.kind().code(),
            message: self.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

/// The JSON body of every error response. Matches the protocol's
/// `ServiceException` record: both fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    /// Stable numeric code identifying the error kind.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.kind().status();

        // Log server-side errors for operator visibility.
        match self.kind() {
            ErrorKind::ServerError | ErrorKind::ResponseValidationFailure => {
                tracing::error!(error = %self, "server-side error");
            }
            ErrorKind::NotImplemented => tracing::info!(error = %self, "not implemented"),
            _ => {}
        }

        (status, Json(self.envelope())).into_response()
    }
}

/// Map any error that reached the boundary to a status and envelope.
///
/// Known [`ServiceError`]s keep their own code and message; anything
/// else is logged and collapsed to the fixed catch-all so internal
/// details never leak into a response body.
pub fn handle_error(err: anyhow::Error) -> (StatusCode, ErrorEnvelope) {
    match err.downcast::<ServiceError>() {
        Ok(service) => (service.kind().status(), service.envelope()),
        Err(other) => {
            tracing::error!(error = %other, "unhandled error reached the service boundary");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::ServerError.envelope(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_protocol::defs;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn error_codes_are_unique() {
        let codes: BTreeSet<u32> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn every_kind_maps_to_a_declared_status() {
        let allowed = [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::NOT_IMPLEMENTED,
        ];
        for kind in ErrorKind::ALL {
            assert!(
                allowed.contains(&kind.status()),
                "{kind:?} maps to unexpected status {}",
                kind.status()
            );
        }
    }

    #[test]
    fn status_mapping_table() {
        assert_eq!(ErrorKind::ServerError.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorKind::ObjectNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::ObjectNotFoundById.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::CallSetNotInVariantSet.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorKind::RequestValidationFailure.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorKind::ResponseValidationFailure.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorKind::NotImplemented.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn request_validation_message_names_every_invalid_field() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsRequest").unwrap();
        let body = json!({"start": "thisIsWrong"});
        let err = ServiceError::request_validation(&body, desc, registry);

        let message = err.to_string();
        assert!(
            message.contains("invalid fields: {'start': 'thisIsWrong'}"),
            "got: {message}"
        );
        // The offending literal appears both in the echoed body and in
        // the violation report.
        assert_eq!(message.matches("thisIsWrong").count(), 2, "got: {message}");
        assert_eq!(err.kind().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_validation_message_surfaces_nested_failures() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsResponse").unwrap();
        let body = json!({
            "alignments": [{
                "fragmentName": "f", "readGroupId": "rg",
                "alignment": {
                    "position": {
                        "referenceName": "chr1", "position": 0, "reverseStrand": false
                    },
                    "mappingQuality": "thisIsWrong"
                }
            }]
        });
        let err = ServiceError::response_validation(&body, desc, registry);

        let message = err.to_string();
        assert!(message.contains("Invalid fields"), "got: {message}");
        assert!(
            message.matches("thisIsWrong").count() >= 2,
            "got: {message}"
        );
        assert_eq!(err.kind().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn envelope_is_a_valid_service_exception_instance() {
        let registry = defs::registry();
        let desc = registry.descriptor("ServiceException").unwrap();
        for kind in ErrorKind::ALL {
            let envelope = ErrorEnvelope {
                code: kind.code(),
                message: "m".to_string(),
            };
            let dict = serde_json::to_value(&envelope).unwrap();
            let report = helix_protocol::validate(&dict, desc, registry);
            assert!(report.is_valid(), "{kind:?}: {report}");
        }
    }

    #[test]
    fn handle_error_keeps_service_error_identity() {
        let err = anyhow::Error::new(ServiceError::ObjectNotFoundById {
            id: "rg-17".to_string(),
        });
        let (status, envelope) = handle_error(err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.code, ErrorKind::ObjectNotFoundById.code());
        assert!(envelope.message.contains("rg-17"));
    }

    #[test]
    fn handle_error_hides_unknown_error_details() {
        let err = anyhow::anyhow!("connection refused to backing store at 10.0.0.7");
        let (status, envelope) = handle_error(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.code, ErrorKind::ServerError.code());
        assert_eq!(envelope.message, SERVER_ERROR_MESSAGE);
        assert!(!envelope.message.contains("10.0.0.7"));
    }

    #[test]
    fn not_implemented_names_the_operation() {
        let err = ServiceError::not_implemented("variants.search");
        assert!(err.to_string().contains("variants.search"));
        assert_eq!(err.kind().code(), 6);
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Helper to extract status and envelope from a Response.
    async fn response_parts(err: ServiceError) -> (StatusCode, ErrorEnvelope) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        (status, envelope)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, envelope) = response_parts(ServiceError::ObjectNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.code, 1);
        assert!(envelope.message.contains("not found"));
    }

    #[tokio::test]
    async fn into_response_request_validation() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsRequest").unwrap();
        let err =
            ServiceError::request_validation(&json!({"start": "thisIsWrong"}), desc, registry);
        let (status, envelope) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.code, 4);
        assert!(envelope.message.contains("thisIsWrong"));
    }

    #[tokio::test]
    async fn into_response_server_error_uses_fixed_message() {
        let (status, envelope) = response_parts(ServiceError::ServerError).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn into_response_not_implemented() {
        let (status, envelope) = response_parts(ServiceError::not_implemented("reads.search")).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(envelope.code, 6);
        assert!(envelope.message.contains("reads.search"));
    }
}
