//! Africa's Talking HTTP client.

use super::types::{Recipient, SendForm, SendResponse, UserData, UserQuery, UserResponse};
use crate::errors::ConfigurationError;
use crate::gateways::error::{GatewayError, Result};
use crate::gateways::response::{RawResponse, execute};
use crate::types::Message;
use crate::utils::http::{HttpSettings, join, parse_base_url};
use crate::utils::phone::normalize_phone;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::Span;
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default Africa's Talking API URL.
pub const DEFAULT_API_URL: &str = "https://api.africastalking.com/version1/";

/// Africa's Talking HTTP client.
#[derive(Clone)]
pub struct AfricasTalking {
    http_client: ClientWithMiddleware,
    username: String,
    api_key: SecretString,
    endpoint: Url,
}

impl std::fmt::Debug for AfricasTalking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AfricasTalking")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring an [`AfricasTalking`] client.
pub struct AfricasTalkingBuilder {
    username: String,
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
}

impl AfricasTalkingBuilder {
    /// Create a new builder with the given account name and API key.
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
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

    /// Build the [`AfricasTalking`] client.
    pub fn build(self) -> std::result::Result<AfricasTalking, ConfigurationError> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => parse_base_url(DEFAULT_API_URL)?,
        };
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpSettings::default().build_client()?,
        };

        Ok(AfricasTalking {
            http_client,
            username: self.username,
            api_key: SecretString::from(self.api_key),
            endpoint,
        })
    }
}

impl AfricasTalking {
    /// Create a client against a custom endpoint.
    pub fn new(
        endpoint: impl AsRef<str>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(username, api_key).endpoint(url).build()
    }

    /// Create a client with the default API URL.
    pub fn with_credentials(
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, ConfigurationError> {
        Self::builder(username, api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(username: impl Into<String>, api_key: impl Into<String>) -> AfricasTalkingBuilder {
        AfricasTalkingBuilder::new(username, api_key)
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.api_key.expose_secret().is_empty()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apiKey", self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
    }

    fn rejection(raw: &RawResponse) -> GatewayError {
        GatewayError::provider(Some(raw.status_code()), raw.text_or_reason())
    }

    /// Send one SMS and return the recipient entry.
    ///
    /// A recipient whose status is not `Success` becomes
    /// [`GatewayError::Recipient`] carrying the status text, e.g.
    /// `InsufficientBalance`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "AfricasTalking::send_message", skip_all, fields(to = %message.to, message_id = tracing::field::Empty))
    )]
    pub async fn send_message(&self, message: &Message) -> Result<Recipient> {
        let to = normalize_phone(&message.to);
        let form = SendForm {
            username: &self.username,
            to: &to,
            message: &message.text,
            from: (!message.from.is_empty()).then_some(message.from.as_str()),
        };
        let body = serde_urlencoded::to_string(&form).map_err(GatewayError::EncodeRequest)?;

        let url = join(&self.endpoint, "messaging");
        let request = self
            .authorized(self.http_client.post(url))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        let raw = execute(request).await?;
        if !raw.is_success() {
            return Err(Self::rejection(&raw));
        }

        let response: SendResponse = raw.json()?;
        let Some(recipient) = response.data.recipients.into_iter().next() else {
            // No recipients means the whole batch was refused; Message says why.
            return Err(GatewayError::provider(
                Some(raw.status_code()),
                response.data.message,
            ));
        };
        if !recipient.is_success() {
            return Err(GatewayError::Recipient {
                code: recipient.status_code,
                status: recipient.status,
            });
        }

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("message_id", recipient.message_id.as_str())
                .set_status(Status::Ok);
        }

        Ok(recipient)
    }

    /// Fetch the account's user data, including the balance string.
    pub async fn get_user(&self) -> Result<UserData> {
        let url = join(&self.endpoint, "user");
        let query = UserQuery {
            username: &self.username,
        };
        let raw = execute(self.authorized(self.http_client.get(url).query(&query))).await?;
        if !raw.is_success() {
            return Err(Self::rejection(&raw));
        }
        let user: UserResponse = raw.json()?;
        Ok(user.user_data)
    }
}
