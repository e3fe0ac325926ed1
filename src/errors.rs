//! Error types and failure classification shared across the crate.

use crate::types::GatewayKind;
use thiserror::Error;

/// Trait for failures that can be classified as retryable or permanent.
///
/// In this crate "retryable" always means "worth one hop through another
/// gateway". Nothing is ever retried against the same gateway.
///
/// # Examples
///
/// ```rust
/// use sms_dispatch::{FailureClass, RetryableError};
///
/// assert!(FailureClass::Connectivity.is_retryable());
/// assert!(FailureClass::TransientProvider.is_retryable());
/// assert!(!FailureClass::TerminalProviderRejection.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if another gateway might accept the same message.
    fn is_retryable(&self) -> bool;
}

/// Category of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Timeout, DNS or TCP failure, or a gateway that could not be reached.
    Connectivity,
    /// HTTP 429/5xx, rate limiting, credit exhaustion, unapproved sender.
    TransientProvider,
    /// Invalid recipient, malformed payload and anything not recognised.
    TerminalProviderRejection,
}

impl RetryableError for FailureClass {
    fn is_retryable(&self) -> bool {
        match self {
            FailureClass::Connectivity | FailureClass::TransientProvider => true,
            FailureClass::TerminalProviderRejection => false,
        }
    }
}

/// Invalid or missing configuration. Raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Required credential fields are absent or empty.
    #[error("Missing credentials for {gateway}: {}", missing.join(", "))]
    MissingCredentials {
        gateway: GatewayKind,
        missing: Vec<&'static str>,
    },

    /// Gateway name does not match any supported provider.
    #[error("Unknown gateway type '{name}'")]
    UnknownGateway { name: String },

    /// Endpoint URL could not be parsed.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// More than one active gateway config is flagged as primary.
    #[error("More than one active primary gateway: {}", names.join(", "))]
    MultiplePrimaries { names: Vec<String> },

    /// No gateway config with this name exists.
    #[error("No gateway config named '{name}'")]
    UnknownGatewayConfig { name: String },

    /// Gateway config exists but is disabled.
    #[error("Gateway config '{name}' is not active")]
    InactiveGateway { name: String },

    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        let err = ConfigurationError::MissingCredentials {
            gateway: GatewayKind::BulkSms,
            missing: vec!["tokenSecret"],
        };
        assert_eq!(err.to_string(), "Missing credentials for bulksms: tokenSecret");
    }

    #[test]
    fn test_multiple_primaries_display() {
        let err = ConfigurationError::MultiplePrimaries {
            names: vec!["bulksms".to_string(), "routee".to_string()],
        };
        assert!(err.to_string().contains("bulksms, routee"));
    }
}
