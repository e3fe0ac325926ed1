//! Wire types for the BulkSMS JSON REST API.

use crate::types::DeliveryState;
use serde::{Deserialize, Serialize};

/// Body of `POST /messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_supplied_id: Option<&'a str>,
}

/// Message resource returned by send and lookup calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSmsMessage {
    pub id: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub credit_cost: Option<f64>,
    pub status: MessageStatus,
}

/// `status` object of a message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageStatus {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl MessageStatus {
    /// Map the BulkSMS status type to a canonical state.
    pub fn state(&self) -> DeliveryState {
        match self.kind.to_ascii_uppercase().as_str() {
            "ACCEPTED" | "SCHEDULED" => DeliveryState::Pending,
            "SENT" => DeliveryState::Sent,
            "DELIVERED" => DeliveryState::Delivered,
            "FAILED" => DeliveryState::Failed,
            _ => DeliveryState::Pending,
        }
    }
}

/// Response of `GET /profile`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
    pub credits: ProfileCredits,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileCredits {
    pub balance: f64,
}

/// Problem document returned with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Problem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl Problem {
    /// The most specific text the provider gave.
    pub fn message(self) -> Option<String> {
        self.detail
            .filter(|d| !d.trim().is_empty())
            .or(self.title.filter(|t| !t.trim().is_empty()))
    }
}
