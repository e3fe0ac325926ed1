//! Wire types for the Routee REST API.

use crate::types::DeliveryState;
use serde::{Deserialize, Serialize};

/// Response of `POST /oauth/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Body of `POST /sms`.
#[derive(Debug, Serialize)]
pub(crate) struct SendSmsRequest<'a> {
    pub body: &'a str,
    pub to: &'a str,
    pub from: &'a str,
}

/// Accepted message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsResponse {
    pub tracking_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub body_analysis: Option<BodyAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BodyAnalysis {
    pub parts: u32,
}

/// One entry of `GET /sms/tracking/single/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub message_id: String,
    pub status: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TrackingEntry {
    pub fn state(&self) -> DeliveryState {
        match self.status.to_ascii_lowercase().as_str() {
            "queued" => DeliveryState::Pending,
            "sent" => DeliveryState::Sent,
            "delivered" => DeliveryState::Delivered,
            "failed" | "undelivered" | "unsent" => DeliveryState::Failed,
            _ => DeliveryState::Pending,
        }
    }
}

/// Response of `GET /accounts/me/balance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Currency {
    pub code: String,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub developer_message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.developer_message.or(self.error_description)
    }
}
