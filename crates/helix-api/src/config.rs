//! # Service Configuration
//!
//! Boundary behavior toggles. Validation of request and response
//! bodies is off by default in production deployments (shape checking
//! every payload is expensive) and on in test configurations, where
//! catching a malformed body early is worth the cost.

/// Boundary configuration for one service instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Validate inbound request bodies against their declared request
    /// type before constructing protocol objects.
    pub request_validation: bool,
    /// Validate outbound response bodies against their declared
    /// response type before sending.
    pub response_validation: bool,
    /// Largest request body the service will accept, in bytes.
    pub max_content_length: usize,
}

/// Default request body cap: 2 MiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 2 * 1024 * 1024;

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_validation: false,
            response_validation: false,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl ServiceConfig {
    /// Configuration used by test deployments: both validation gates
    /// on.
    pub fn testing() -> Self {
        Self {
            request_validation: true,
            response_validation: true,
            ..Self::default()
        }
    }
}
