//! Error type shared by the gateway HTTP clients.

use crate::types::{GatewayKind, SendResult};
use thiserror::Error;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Failure of a gateway client call.
///
/// The `Display` text is what ends up in [`SendResult::error`], so transport
/// failures start with wording the dispatch classifier recognises and provider
/// rejections are rendered verbatim.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request did not complete within the configured timeout.
    #[error("Request timeout: {0}")]
    Timeout(#[source] reqwest_middleware::Error),

    /// DNS or TCP connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(#[source] reqwest_middleware::Error),

    /// Any other transport failure.
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[source] reqwest_middleware::Error),

    /// Failed to read the response body.
    #[error("Failed to read response: {0}")]
    ParseResponse(#[source] reqwest::Error),

    /// Failed to deserialize JSON response.
    #[error("Failed to deserialize JSON response: {0}")]
    DeserializeJson(#[source] serde_json::Error),

    /// Failed to encode a form or query string.
    #[error("Failed to encode request: {0}")]
    EncodeRequest(#[source] serde_urlencoded::ser::Error),

    /// Provider rejected the request. `message` is the provider's own text.
    #[error("{message}")]
    Provider { status: Option<u16>, message: String },

    /// Request was accepted but the provider refused one recipient. `code` is
    /// the provider's own per-recipient code, not an HTTP status.
    #[error("{status}")]
    Recipient { code: u16, status: String },

    /// Provider refused the credentials.
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// Response had a shape the client does not understand.
    #[error("Unexpected response: {raw}")]
    UnexpectedResponse { raw: String },
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Classify a transport error into timeout, connection or generic failure.
    pub fn transport(err: reqwest_middleware::Error) -> Self {
        match &err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => Self::Timeout(err),
            reqwest_middleware::Error::Reqwest(e) if e.is_connect() => Self::Connection(err),
            _ => Self::HttpRequest(err),
        }
    }

    /// Provider rejection with an optional status code.
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            Self::Authentication { status, .. } => Some(*status),
            Self::Recipient { .. } => None,
            Self::Timeout(_) | Self::Connection(_) | Self::HttpRequest(_) => None,
            Self::ParseResponse(e) => e.status().map(|s| s.as_u16()),
            Self::DeserializeJson(_) | Self::EncodeRequest(_) | Self::UnexpectedResponse { .. } => {
                None
            }
        }
    }

    /// Provider-specific recipient code, if the failure carried one.
    pub fn provider_code(&self) -> Option<u16> {
        match self {
            Self::Recipient { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Convert into a failed [`SendResult`] for `gateway`.
    pub fn into_send_result(self, gateway: GatewayKind) -> SendResult {
        #[cfg(feature = "tracing")]
        warn!(gateway = %gateway, error = %self, "Gateway call failed");

        let status = self.status_code();
        SendResult::failed(gateway, self.to_string(), status)
    }
}
