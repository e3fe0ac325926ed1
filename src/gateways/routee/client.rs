//! Routee HTTP client with OAuth2 client-credentials authentication.

use super::token::{AccessToken, TokenCache};
use super::types::{
    BalanceResponse, ErrorBody, SendSmsRequest, SendSmsResponse, TokenResponse, TrackingEntry,
};
use crate::errors::ConfigurationError;
use crate::gateways::error::{GatewayError, Result};
use crate::gateways::response::{RawResponse, execute};
use crate::types::Message;
use crate::utils::http::{HttpSettings, join, join_segments, parse_base_url};
use crate::utils::phone::to_e164;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default Routee API URL.
pub const DEFAULT_API_URL: &str = "https://connect.routee.net/";

/// Default Routee authorization server URL.
pub const DEFAULT_AUTH_URL: &str = "https://auth.routee.net/";

/// Dial code used for numbers without an international prefix.
pub const DEFAULT_DIAL_CODE: &str = "244";

/// Routee HTTP client.
///
/// Exchanges the application id/secret for a bearer token, caches it until
/// shortly before it expires and reuses it across clones of the client.
#[derive(Clone)]
pub struct Routee {
    http_client: ClientWithMiddleware,
    application_id: SecretString,
    application_secret: SecretString,
    endpoint: Url,
    auth_endpoint: Url,
    default_dial_code: String,
    token_cache: Arc<TokenCache>,
}

impl std::fmt::Debug for Routee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routee")
            .field("endpoint", &self.endpoint)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("default_dial_code", &self.default_dial_code)
            .field("application_id", &"[REDACTED]")
            .field("application_secret", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`Routee`] client.
pub struct RouteeBuilder {
    application_id: String,
    application_secret: String,
    endpoint: Option<Url>,
    auth_endpoint: Option<Url>,
    default_dial_code: String,
    http_client: Option<ClientWithMiddleware>,
}

impl RouteeBuilder {
    /// Create a new builder with the given application credentials.
    pub fn new(application_id: impl Into<String>, application_secret: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            application_secret: application_secret.into(),
            endpoint: None,
            auth_endpoint: None,
            default_dial_code: DEFAULT_DIAL_CODE.to_string(),
            http_client: None,
        }
    }

    /// Set a custom API endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom authorization endpoint.
    pub fn auth_endpoint(mut self, endpoint: Url) -> Self {
        self.auth_endpoint = Some(endpoint);
        self
    }

    /// Set the dial code applied to numbers without an international prefix.
    pub fn default_dial_code(mut self, dial_code: impl Into<String>) -> Self {
        self.default_dial_code = dial_code.into().trim_start_matches('+').to_string();
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the [`Routee`] client.
    pub fn build(self) -> std::result::Result<Routee, ConfigurationError> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => parse_base_url(DEFAULT_API_URL)?,
        };
        let auth_endpoint = match self.auth_endpoint {
            Some(url) => url,
            None => parse_base_url(DEFAULT_AUTH_URL)?,
        };
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpSettings::default().build_client()?,
        };

        Ok(Routee {
            http_client,
            application_id: SecretString::from(self.application_id),
            application_secret: SecretString::from(self.application_secret),
            endpoint,
            auth_endpoint,
            default_dial_code: self.default_dial_code,
            token_cache: Arc::new(TokenCache::default()),
        })
    }
}

impl Routee {
    /// Create a client whose API and authorization server share one base URL.
    pub fn new(
        endpoint: impl AsRef<str>,
        application_id: impl Into<String>,
        application_secret: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(application_id, application_secret)
            .endpoint(url.clone())
            .auth_endpoint(url)
            .build()
    }

    /// Create a client with the default URLs.
    pub fn with_credentials(
        application_id: impl Into<String>,
        application_secret: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        Self::builder(application_id, application_secret).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(
        application_id: impl Into<String>,
        application_secret: impl Into<String>,
    ) -> RouteeBuilder {
        RouteeBuilder::new(application_id, application_secret)
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.application_id.expose_secret().is_empty()
            && !self.application_secret.expose_secret().is_empty()
    }

    /// Normalize a destination number to E.164.
    pub fn normalize_number(&self, phone: &str) -> String {
        to_e164(phone, &self.default_dial_code)
    }

    /// Request a new token from the authorization server.
    async fn fetch_token(&self) -> Result<AccessToken> {
        let url = join(&self.auth_endpoint, "oauth/token");
        let request = self
            .http_client
            .post(url)
            .basic_auth(
                self.application_id.expose_secret(),
                Some(self.application_secret.expose_secret()),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials");

        let raw = execute(request).await?;
        if !raw.is_success() {
            return Err(GatewayError::Authentication {
                status: raw.status_code(),
                message: Self::error_message(&raw),
            });
        }

        let token: TokenResponse = raw.json()?;

        #[cfg(feature = "tracing")]
        debug!(expires_in = token.expires_in, "Fetched Routee access token");

        Ok(AccessToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Cached bearer token, refreshed when stale.
    pub(crate) async fn access_token(&self) -> Result<SecretString> {
        if let Some(token) = self.token_cache.fresh().await {
            return Ok(token);
        }
        let token = self.fetch_token().await?;
        let value = token.value();
        self.token_cache.store(token).await;
        Ok(value)
    }

    fn error_message(raw: &RawResponse) -> String {
        serde_json::from_str::<ErrorBody>(&raw.text)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| raw.text_or_reason())
    }

    /// Execute an authorized API call, dropping the cached token on 401.
    async fn call(&self, request: RequestBuilder) -> Result<RawResponse> {
        let token = self.access_token().await?;
        let raw = execute(request.bearer_auth(token.expose_secret())).await?;
        if raw.status == StatusCode::UNAUTHORIZED {
            self.token_cache.invalidate().await;
        }
        if !raw.is_success() {
            return Err(GatewayError::provider(
                Some(raw.status_code()),
                Self::error_message(&raw),
            ));
        }
        Ok(raw)
    }

    /// Send one SMS.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "Routee::send_sms", skip_all, fields(to = %message.to, message_id = tracing::field::Empty))
    )]
    pub async fn send_sms(&self, message: &Message) -> Result<SendSmsResponse> {
        let to = self.normalize_number(&message.to);
        let body = SendSmsRequest {
            body: &message.text,
            to: &to,
            from: &message.from,
        };
        let url = join(&self.endpoint, "sms");
        let raw = self.call(self.http_client.post(url).json(&body)).await?;
        let sent: SendSmsResponse = raw.json()?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("message_id", sent.tracking_id.as_str())
                .set_status(Status::Ok);
        }

        Ok(sent)
    }

    /// Track a message by id.
    pub async fn track(&self, message_id: &str) -> Result<TrackingEntry> {
        let url = join_segments(&self.endpoint, ["sms", "tracking", "single", message_id]);
        let raw = self.call(self.http_client.get(url)).await?;
        let entries: Vec<TrackingEntry> = raw.json()?;
        entries
            .into_iter()
            .last()
            .ok_or(GatewayError::UnexpectedResponse { raw: raw.text })
    }

    /// Fetch the account balance.
    pub async fn balance(&self) -> Result<BalanceResponse> {
        let url = join(&self.endpoint, "accounts/me/balance");
        let raw = self.call(self.http_client.get(url)).await?;
        raw.json()
    }

    /// Fetch a token without using the cache, to confirm the credentials.
    pub async fn authenticate(&self) -> Result<()> {
        let token = self.fetch_token().await?;
        self.token_cache.store(token).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_partial_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer, expires_in: u64, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(basic_auth("app", "secret"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": expires_in,
                "scope": "sms"
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn accepted() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "trackingId": "b6d8b0a0-1234",
            "createdAt": "2025-01-01T12:00:00.000Z",
            "from": "ACME",
            "to": "+244923456789",
            "body": "Hello",
            "status": "Queued",
            "bodyAnalysis": {"characters": 5, "parts": 1, "transcoded": false}
        }))
    }

    #[tokio::test]
    async fn test_token_is_cached_between_sends() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 3600, 1).await;

        Mock::given(method("POST"))
            .and(path("/sms"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(serde_json::json!({"to": "+244923456789"})))
            .respond_with(accepted())
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "secret").unwrap();
        let message = Message::new("923 456 789", "ACME", "Hello");
        let first = client.send_sms(&message).await.unwrap();
        let second = client.clone().send_sms(&message).await.unwrap();

        assert_eq!(first.tracking_id, "b6d8b0a0-1234");
        assert_eq!(second.body_analysis.map(|b| b.parts), Some(1));
    }

    #[tokio::test]
    async fn test_token_inside_margin_is_refreshed() {
        let mock_server = MockServer::start().await;
        // 30s is below the 60s margin, so each call needs a new token.
        mount_token(&mock_server, 30, 2).await;

        Mock::given(method("POST"))
            .and(path("/sms"))
            .respond_with(accepted())
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "secret").unwrap();
        let message = Message::new("+244923456789", "ACME", "Hello");
        client.send_sms(&message).await.unwrap();
        client.send_sms(&message).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_sends_on_stale_cache() {
        let mock_server = MockServer::start().await;
        // Every token is already inside the margin, so each send refreshes.
        mount_token(&mock_server, 30, 3).await;

        Mock::given(method("POST"))
            .and(path("/sms"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(accepted())
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "secret").unwrap();
        let message = Message::new("+244923456789", "ACME", "Hello");
        client.send_sms(&message).await.unwrap();

        let other = client.clone();
        let (first, second) = tokio::join!(client.send_sms(&message), other.send_sms(&message));
        assert_eq!(first.unwrap().tracking_id, "b6d8b0a0-1234");
        assert_eq!(second.unwrap().tracking_id, "b6d8b0a0-1234");
    }

    #[tokio::test]
    async fn test_concurrent_sends_share_a_cold_cache() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "expires_in": 3600
            })))
            .expect(1..=2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/sms"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(accepted())
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "secret").unwrap();
        let message = Message::new("+244923456789", "ACME", "Hello");
        let (first, second) = tokio::join!(client.send_sms(&message), client.send_sms(&message));
        assert!(first.is_ok());
        assert!(second.is_ok());

        // Whichever fetch won, the cached token is complete and reused.
        client.send_sms(&message).await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "Bad credentials"
            })))
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "wrong").unwrap();
        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, GatewayError::Authentication { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_send_rejection_surfaces_developer_message() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 3600, 1).await;

        Mock::given(method("POST"))
            .and(path("/sms"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "developerMessage": "Sender id not approved",
                "entity": "sms",
                "code": "400010"
            })))
            .mount(&mock_server)
            .await;

        let client = Routee::new(mock_server.uri(), "app", "secret").unwrap();
        let err = client
            .send_sms(&Message::new("+244923456789", "NEWBRAND", "Hello"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Sender id not approved");
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_normalize_number_uses_default_dial_code() {
        let client = Routee::builder("app", "secret")
            .default_dial_code("+351")
            .build()
            .unwrap();
        assert_eq!(client.normalize_number("911 222 333"), "+351911222333");
        assert_eq!(client.normalize_number("+244923456789"), "+244923456789");
    }
}
