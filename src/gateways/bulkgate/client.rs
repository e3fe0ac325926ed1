//! BulkGate HTTP client.

use super::types::{
    AccountInfo, Envelope, InfoRequest, SenderKind, TransactionalRequest, TransactionalResponse,
};
use crate::errors::ConfigurationError;
use crate::gateways::error::{GatewayError, Result};
use crate::gateways::response::{RawResponse, execute};
use crate::types::Message;
use crate::utils::http::{HttpSettings, join, parse_base_url};
use crate::utils::phone::normalize_phone;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::Span;
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default BulkGate Simple API URL.
pub const DEFAULT_API_URL: &str = "https://portal.bulkgate.com/api/1.0/simple/";

/// BulkGate HTTP client.
///
/// The API key (application token) travels as a JSON body field on every
/// request. The application id is optional and sent alongside when set.
#[derive(Clone)]
pub struct BulkGate {
    http_client: ClientWithMiddleware,
    api_key: SecretString,
    application_id: Option<String>,
    endpoint: Url,
}

impl std::fmt::Debug for BulkGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkGate")
            .field("endpoint", &self.endpoint)
            .field("application_id", &self.application_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`BulkGate`] client.
pub struct BulkGateBuilder {
    api_key: String,
    application_id: Option<String>,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
}

impl BulkGateBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            application_id: None,
            endpoint: None,
            http_client: None,
        }
    }

    /// Set the application id sent with each request.
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// Set a custom API endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the [`BulkGate`] client.
    pub fn build(self) -> std::result::Result<BulkGate, ConfigurationError> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => parse_base_url(DEFAULT_API_URL)?,
        };
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpSettings::default().build_client()?,
        };

        Ok(BulkGate {
            http_client,
            api_key: SecretString::from(self.api_key),
            application_id: self.application_id.filter(|id| !id.is_empty()),
            endpoint,
        })
    }
}

impl BulkGate {
    /// Create a client against a custom endpoint.
    pub fn new(
        endpoint: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(api_key).endpoint(url).build()
    }

    /// Create a client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> std::result::Result<Self, ConfigurationError> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> BulkGateBuilder {
        BulkGateBuilder::new(api_key)
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    /// Unwrap the `data` member or surface the provider's error text.
    fn unwrap_envelope<T: DeserializeOwned>(raw: RawResponse) -> Result<T> {
        let status = raw.status_code();
        let envelope = match raw.json::<Envelope<T>>() {
            Ok(envelope) => envelope,
            Err(_) if !raw.is_success() => {
                return Err(GatewayError::provider(Some(status), raw.text_or_reason()));
            }
            Err(e) => return Err(e),
        };

        if let Some(data) = envelope.data
            && envelope.error.is_none()
        {
            return Ok(data);
        }

        match envelope.error.or(envelope.kind) {
            Some(message) => Err(GatewayError::provider(
                envelope.code.or(Some(status)),
                message,
            )),
            None => Err(GatewayError::UnexpectedResponse { raw: raw.text }),
        }
    }

    /// Submit one transactional message.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "BulkGate::send_transactional", skip_all, fields(to = %message.to, message_id = tracing::field::Empty))
    )]
    pub async fn send_transactional(&self, message: &Message) -> Result<TransactionalResponse> {
        let number = normalize_phone(&message.to);
        let sender_id = SenderKind::for_sender(&message.from);
        let body = TransactionalRequest {
            application_id: self.application_id.as_deref(),
            application_token: self.api_key.expose_secret(),
            number: number.trim_start_matches('+'),
            text: &message.text,
            unicode: !message.text.is_ascii(),
            sender_id,
            sender_id_value: (sender_id != SenderKind::System).then_some(message.from.as_str()),
            tag: message.campaign_id.as_deref(),
        };

        let url = join(&self.endpoint, "transactional");
        let raw = execute(self.http_client.post(url).json(&body)).await?;
        let data: TransactionalResponse = Self::unwrap_envelope(raw)?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("message_id", data.sms_id.as_str())
                .set_status(Status::Ok);
        }

        Ok(data)
    }

    /// Fetch wallet information, including the credit balance.
    pub async fn get_info(&self) -> Result<AccountInfo> {
        let body = InfoRequest {
            application_id: self.application_id.as_deref(),
            application_token: self.api_key.expose_secret(),
        };
        let url = join(&self.endpoint, "info");
        let raw = execute(self.http_client.post(url).json(&body)).await?;
        Self::unwrap_envelope(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_transactional_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactional"))
            .and(body_partial_json(serde_json::json!({
                "application_token": "key",
                "number": "244923456789",
                "sender_id": "gText",
                "sender_id_value": "ACME"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "status": "accepted",
                    "sms_id": "tmpde1bcd4b1d1",
                    "part_id": ["tmpde1bcd4b1d1"],
                    "number": "244923456789",
                    "price": 1,
                    "credit": 120.5
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BulkGate::new(mock_server.uri(), "key").unwrap();
        let data = client
            .send_transactional(&Message::new("+244 923 456 789", "ACME", "Ola"))
            .await
            .unwrap();

        assert_eq!(data.sms_id, "tmpde1bcd4b1d1");
        assert_eq!(data.price, Some(1.0));
    }

    #[tokio::test]
    async fn test_send_transactional_error_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactional"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "type": "invalid_phone_number",
                "code": 400,
                "error": "Invalid phone number",
                "detail": null
            })))
            .mount(&mock_server)
            .await;

        let client = BulkGate::new(mock_server.uri(), "key").unwrap();
        let err = client
            .send_transactional(&Message::new("12", "ACME", "Ola"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid phone number");
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn test_get_info() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "wallet": "bg1805151838000001",
                    "credit": 215.8138,
                    "currency": "credits",
                    "free_messages": 51,
                    "datetime": "2018-06-15T13:21:37+02:00"
                }
            })))
            .mount(&mock_server)
            .await;

        let client = BulkGate::builder("key")
            .application_id("1234")
            .endpoint(parse_base_url(&mock_server.uri()).unwrap())
            .build()
            .unwrap();
        let info = client.get_info().await.unwrap();
        assert_eq!(info.credit, 215.8138);
        assert_eq!(info.currency.as_deref(), Some("credits"));
    }

    #[tokio::test]
    async fn test_plain_text_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let client = BulkGate::new(mock_server.uri(), "key").unwrap();
        let err = client.get_info().await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.to_string(), "Bad Gateway");
    }
}
