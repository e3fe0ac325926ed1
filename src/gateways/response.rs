//! Request execution and response decoding shared by the gateway clients.

use super::error::{GatewayError, Result};
use reqwest::StatusCode;
use reqwest_middleware::RequestBuilder;
use serde::de::DeserializeOwned;

/// Raw HTTP response: status plus body text.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub text: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text).map_err(GatewayError::DeserializeJson)
    }

    /// Body text, or the canonical status reason when the body is empty.
    pub fn text_or_reason(&self) -> String {
        let text = self.text.trim();
        if text.is_empty() {
            self.status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            text.to_string()
        }
    }
}

/// Send a request and read the whole body.
pub(crate) async fn execute(request: RequestBuilder) -> Result<RawResponse> {
    let response = request.send().await.map_err(GatewayError::transport)?;
    let status = response.status();
    let text = response.text().await.map_err(GatewayError::ParseResponse)?;
    Ok(RawResponse { status, text })
}
