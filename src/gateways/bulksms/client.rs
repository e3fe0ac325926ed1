//! BulkSMS HTTP client.

use super::types::{BulkSmsMessage, Problem, Profile, SendMessageRequest};
use crate::errors::ConfigurationError;
use crate::gateways::error::{GatewayError, Result};
use crate::gateways::response::{RawResponse, execute};
use crate::types::Message;
use crate::utils::http::{HttpSettings, join, join_segments, parse_base_url};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::Span;
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default BulkSMS API URL.
pub const DEFAULT_API_URL: &str = "https://api.bulksms.com/v1/";

/// BulkSMS HTTP client.
///
/// Authenticates every call with HTTP Basic auth over an API token id/secret
/// pair.
///
/// # Example
///
/// ```rust,ignore
/// use sms_dispatch::gateways::bulksms::BulkSms;
/// use sms_dispatch::{Gateway, Message};
///
/// let client = BulkSms::with_credentials("token_id", "token_secret")?;
/// let result = client.send_single(&Message::new("+351911222333", "ACME", "Hello")).await;
/// ```
#[derive(Clone)]
pub struct BulkSms {
    http_client: ClientWithMiddleware,
    token_id: SecretString,
    token_secret: SecretString,
    endpoint: Url,
}

impl std::fmt::Debug for BulkSms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkSms")
            .field("endpoint", &self.endpoint)
            .field("token_id", &"[REDACTED]")
            .field("token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`BulkSms`] client.
pub struct BulkSmsBuilder {
    token_id: String,
    token_secret: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
}

impl BulkSmsBuilder {
    /// Create a new builder with the given token pair.
    pub fn new(token_id: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            token_secret: token_secret.into(),
            endpoint: None,
            http_client: None,
        }
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

    /// Build the [`BulkSms`] client.
    pub fn build(self) -> std::result::Result<BulkSms, ConfigurationError> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => parse_base_url(DEFAULT_API_URL)?,
        };
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpSettings::default().build_client()?,
        };

        Ok(BulkSms {
            http_client,
            token_id: SecretString::from(self.token_id),
            token_secret: SecretString::from(self.token_secret),
            endpoint,
        })
    }
}

impl BulkSms {
    /// Create a client against a custom endpoint.
    pub fn new(
        endpoint: impl AsRef<str>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(token_id, token_secret).endpoint(url).build()
    }

    /// Create a client with the default API URL.
    pub fn with_credentials(
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        Self::builder(token_id, token_secret).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(token_id: impl Into<String>, token_secret: impl Into<String>) -> BulkSmsBuilder {
        BulkSmsBuilder::new(token_id, token_secret)
    }

    /// True when both token parts are non-empty.
    pub(crate) fn has_credentials(&self) -> bool {
        !self.token_id.expose_secret().is_empty() && !self.token_secret.expose_secret().is_empty()
    }

    fn authorized(&self, request: reqwest_middleware::RequestBuilder) -> reqwest_middleware::RequestBuilder {
        request.basic_auth(
            self.token_id.expose_secret(),
            Some(self.token_secret.expose_secret()),
        )
    }

    /// Turn a non-2xx response into a provider error carrying its text.
    fn rejection(raw: &RawResponse) -> GatewayError {
        let message = serde_json::from_str::<Problem>(&raw.text)
            .ok()
            .and_then(Problem::message)
            .unwrap_or_else(|| raw.text_or_reason());
        GatewayError::provider(Some(raw.status_code()), message)
    }

    /// Submit one message.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "BulkSms::send_message", skip_all, fields(to = %message.to, message_id = tracing::field::Empty))
    )]
    pub async fn send_message(&self, message: &Message) -> Result<BulkSmsMessage> {
        let mut url = join(&self.endpoint, "messages");
        url.set_query(Some("auto-unicode=true"));

        let body = SendMessageRequest {
            to: &message.to,
            from: &message.from,
            body: &message.text,
            user_supplied_id: message.campaign_id.as_deref(),
        };

        let raw = execute(self.authorized(self.http_client.post(url)).json(&body)).await?;
        if !raw.is_success() {
            return Err(Self::rejection(&raw));
        }

        let mut messages: Vec<BulkSmsMessage> = raw.json()?;
        if messages.is_empty() {
            return Err(GatewayError::UnexpectedResponse { raw: raw.text });
        }
        let sent = messages.swap_remove(0);

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("message_id", sent.id.as_str())
                .set_status(Status::Ok);
        }

        Ok(sent)
    }

    /// Look up a message by id.
    pub async fn get_message(&self, message_id: &str) -> Result<BulkSmsMessage> {
        let url = join_segments(&self.endpoint, ["messages", message_id]);
        let raw = execute(self.authorized(self.http_client.get(url))).await?;
        if !raw.is_success() {
            return Err(Self::rejection(&raw));
        }
        raw.json()
    }

    /// Fetch the account profile, which carries the credit balance.
    pub async fn get_profile(&self) -> Result<Profile> {
        let url = join(&self.endpoint, "profile");
        let raw = execute(self.authorized(self.http_client.get(url))).await?;
        if !raw.is_success() {
            return Err(Self::rejection(&raw));
        }
        raw.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_message_success() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!([{
            "id": "2030213351",
            "type": "SENT",
            "from": "ACME",
            "to": "+351911222333",
            "body": "Hello",
            "creditCost": 1,
            "status": {"id": "ACCEPTED.null", "type": "ACCEPTED", "subtype": null}
        }]);

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(query_param("auto-unicode", "true"))
            .and(basic_auth("id", "secret"))
            .and(body_partial_json(serde_json::json!({
                "to": "+351911222333",
                "from": "ACME",
                "body": "Hello"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&response_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BulkSms::new(mock_server.uri(), "id", "secret").unwrap();
        let sent = client
            .send_message(&Message::new("+351911222333", "ACME", "Hello"))
            .await
            .unwrap();

        assert_eq!(sent.id, "2030213351");
        assert_eq!(sent.credit_cost, Some(1.0));
    }

    #[tokio::test]
    async fn test_send_message_insufficient_credits() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "type": "https://developer.bulksms.com/json/v1/errors#insufficient-credits",
                "title": "Insufficient credits",
                "status": 403,
                "detail": "Insufficient credits to send this message"
            })))
            .mount(&mock_server)
            .await;

        let client = BulkSms::new(mock_server.uri(), "id", "secret").unwrap();
        let err = client
            .send_message(&Message::new("+351911222333", "ACME", "Hello"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "Insufficient credits to send this message");
    }

    #[tokio::test]
    async fn test_get_profile() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1",
                "username": "acme",
                "credits": {"balance": 812.5, "isTransferAllowed": false}
            })))
            .mount(&mock_server)
            .await;

        let client = BulkSms::new(mock_server.uri(), "id", "secret").unwrap();
        let profile = client.get_profile().await.unwrap();
        assert_eq!(profile.credits.balance, 812.5);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let client = BulkSms::with_credentials("id", "very-secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
