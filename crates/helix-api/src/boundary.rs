//! # Request/Response Boundary
//!
//! The marshaling seam between raw JSON bodies and protocol objects.
//! Both directions run the optional validation gate from
//! [`ServiceConfig`]: a bad inbound body is the client's fault (400),
//! a bad outbound body is ours (500). With both gates off, decoding is
//! total and never rejects a body.

use serde_json::Value;

use helix_protocol::{from_json_dict, to_json_dict, validate, ProtocolObject, ProtocolRegistry};

use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Decode one inbound request body into a protocol object.
///
/// The named type must exist in the registry; a missing type is a
/// deployment fault, not a client error. When request validation is
/// enabled, a body that is not a valid instance fails with the full
/// violation report before any object is built.
pub fn decode_request(
    body: &Value,
    type_name: &str,
    config: &ServiceConfig,
    registry: &ProtocolRegistry,
) -> Result<ProtocolObject, ServiceError> {
    let Some(descriptor) = registry.descriptor(type_name) else {
        tracing::error!(type_name, "request type missing from protocol registry");
        return Err(ServiceError::ServerError);
    };

    if config.request_validation {
        let report = validate(body, descriptor, registry);
        if !report.is_valid() {
            return Err(ServiceError::request_validation(body, descriptor, registry));
        }
    }

    Ok(from_json_dict(body, descriptor, registry))
}

/// Encode one outbound protocol object into its JSON wire body.
///
/// When response validation is enabled, the produced body is checked
/// against the object's own descriptor; a failure means the server
/// assembled a response that violates the protocol.
pub fn encode_response(
    object: &ProtocolObject,
    config: &ServiceConfig,
    registry: &ProtocolRegistry,
) -> Result<Value, ServiceError> {
    let body = to_json_dict(object);

    if config.response_validation {
        let Some(descriptor) = registry.descriptor(object.type_name()) else {
            tracing::error!(
                type_name = object.type_name(),
                "response type missing from protocol registry"
            );
            return Err(ServiceError::ServerError);
        };
        let report = validate(&body, descriptor, registry);
        if !report.is_valid() {
            return Err(ServiceError::response_validation(&body, descriptor, registry));
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use helix_protocol::defs;
    use helix_protocol::FieldValue;
    use serde_json::json;

    #[test]
    fn decode_builds_object_with_defaults_applied() {
        let registry = defs::registry();
        let object = decode_request(
            &json!({"referenceName": "chr2"}),
            "SearchReadsRequest",
            &ServiceConfig::default(),
            registry,
        )
        .unwrap();
        assert_eq!(object.type_name(), "SearchReadsRequest");
        match object.get("start") {
            Some(FieldValue::Scalar(v)) => assert_eq!(v, &json!(0)),
            other => panic!("expected defaulted start, got {other:?}"),
        }
    }

    #[test]
    fn decode_without_gate_accepts_invalid_body() {
        let registry = defs::registry();
        let result = decode_request(
            &json!({"start": "thisIsWrong"}),
            "SearchReadsRequest",
            &ServiceConfig::default(),
            registry,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn decode_with_gate_rejects_invalid_body() {
        let registry = defs::registry();
        let err = decode_request(
            &json!({"start": "thisIsWrong"}),
            "SearchReadsRequest",
            &ServiceConfig::testing(),
            registry,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestValidationFailure);
        assert!(err.to_string().contains("thisIsWrong"));
    }

    #[test]
    fn decode_unknown_type_is_a_server_fault() {
        let registry = defs::registry();
        let err = decode_request(
            &json!({}),
            "NoSuchRequest",
            &ServiceConfig::testing(),
            registry,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn encode_round_trips_a_valid_response() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsResponse").unwrap();
        let object = from_json_dict(&json!({"nextPageToken": "tok"}), desc, registry);
        let body = encode_response(&object, &ServiceConfig::testing(), registry).unwrap();
        assert_eq!(body["nextPageToken"], json!("tok"));
        assert_eq!(body["alignments"], json!([]));
    }

    #[test]
    fn encode_with_gate_rejects_invalid_response() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsResponse").unwrap();
        // Lenient construction keeps the bad scalar; the outbound gate
        // is what catches it.
        let object = from_json_dict(&json!({"nextPageToken": 17}), desc, registry);
        let err = encode_response(&object, &ServiceConfig::testing(), registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseValidationFailure);
    }

    #[test]
    fn encode_without_gate_passes_invalid_response_through() {
        let registry = defs::registry();
        let desc = registry.descriptor("SearchReadsResponse").unwrap();
        let object = from_json_dict(&json!({"nextPageToken": 17}), desc, registry);
        let body = encode_response(&object, &ServiceConfig::default(), registry).unwrap();
        assert_eq!(body["nextPageToken"], json!(17));
    }
}
