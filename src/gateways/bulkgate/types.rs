//! Wire types for the BulkGate Simple API.

use serde::{Deserialize, Serialize};

/// Sender type understood by BulkGate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SenderKind {
    /// BulkGate system number.
    #[serde(rename = "gSystem")]
    System,
    /// Alphanumeric text sender.
    #[serde(rename = "gText")]
    Text,
    /// Own verified number.
    #[serde(rename = "gOwn")]
    Own,
}

impl SenderKind {
    /// Pick the sender type from the `from` field of a message.
    pub fn for_sender(from: &str) -> Self {
        let trimmed = from.trim().trim_start_matches('+');
        if trimmed.is_empty() {
            SenderKind::System
        } else if trimmed.chars().all(|c| c.is_ascii_digit()) {
            SenderKind::Own
        } else {
            SenderKind::Text
        }
    }
}

/// Body of `POST transactional`.
#[derive(Debug, Serialize)]
pub(crate) struct TransactionalRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<&'a str>,
    pub application_token: &'a str,
    pub number: &'a str,
    pub text: &'a str,
    pub unicode: bool,
    pub sender_id: SenderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id_value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'a str>,
}

/// Body of `POST info`.
#[derive(Debug, Serialize)]
pub(crate) struct InfoRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<&'a str>,
    pub application_token: &'a str,
}

/// BulkGate wraps every answer in either `data` or an error document.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Accepted transactional message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionalResponse {
    pub status: String,
    pub sms_id: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub credit: Option<f64>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Account information.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub wallet: Option<String>,
    pub credit: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub free_messages: Option<u64>,
}
