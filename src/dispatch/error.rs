//! Dispatch errors.

use crate::errors::ConfigurationError;
use crate::types::GatewayKind;
use thiserror::Error;

/// Reasons the engine could not even attempt a send.
///
/// Provider failures are never errors here; they are recorded in the attempt
/// trail of a [`FallbackResult`](super::FallbackResult).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The config set has no active primary gateway.
    #[error("No primary gateway configured")]
    NoPrimaryGateway,

    /// Neither gateway of the country pair is registered.
    #[error("No gateway available: neither {0} nor {1} is registered")]
    NoGatewayAvailable(GatewayKind, GatewayKind),

    /// The policy names a gateway the registry does not hold.
    #[error("Gateway {0} is not registered")]
    GatewayNotRegistered(GatewayKind),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
