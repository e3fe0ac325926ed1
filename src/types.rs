//! Canonical message and result types shared by every gateway.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use time::OffsetDateTime;

// =============================================================================
// GatewayKind
// =============================================================================

/// Closed set of supported SMS providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// BulkSMS (bulksms.com), HTTP Basic auth.
    #[serde(rename = "bulksms")]
    BulkSms,
    /// BulkGate, application token in the body.
    #[serde(rename = "bulkgate")]
    BulkGate,
    /// Routee by AMD Telecom, OAuth2 client credentials.
    Routee,
    /// Africa's Talking, API key header and form bodies.
    #[serde(rename = "africastalking")]
    AfricasTalking,
}

impl GatewayKind {
    /// All supported gateways.
    pub const ALL: [GatewayKind; 4] = [
        GatewayKind::BulkSms,
        GatewayKind::BulkGate,
        GatewayKind::Routee,
        GatewayKind::AfricasTalking,
    ];

    /// Stable lowercase name, e.g. `"bulksms"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::BulkSms => "bulksms",
            GatewayKind::BulkGate => "bulkgate",
            GatewayKind::Routee => "routee",
            GatewayKind::AfricasTalking => "africastalking",
        }
    }
}

impl Display for GatewayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GatewayKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '\''))
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "bulksms" => Ok(GatewayKind::BulkSms),
            "bulkgate" => Ok(GatewayKind::BulkGate),
            "routee" | "amdtelecom" => Ok(GatewayKind::Routee),
            "africastalking" => Ok(GatewayKind::AfricasTalking),
            _ => Err(ConfigurationError::UnknownGateway {
                name: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// Outbound SMS in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Recipient phone number.
    pub to: String,
    /// Sender ID or phone number.
    pub from: String,
    /// Message body.
    pub text: String,
    /// Campaign the message belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
}

impl Message {
    /// Create a message without a campaign.
    pub fn new(to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            text: text.into(),
            campaign_id: None,
        }
    }

    /// Attach a campaign id.
    pub fn with_campaign(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }
}

// =============================================================================
// SendResult
// =============================================================================

/// Outcome of a single provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub success: bool,
    /// Provider message id, only set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Raw provider error text, only set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Units billed by the provider (segments or credits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub gateway: GatewayKind,
    /// HTTP status code of a failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl SendResult {
    /// Successful send.
    pub fn sent(gateway: GatewayKind, message_id: impl Into<String>, cost: Option<f64>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
            cost,
            gateway,
            status_code: None,
        }
    }

    /// Failed send.
    pub fn failed(gateway: GatewayKind, error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            cost: None,
            gateway,
            status_code,
        }
    }

    /// Error text, empty on success.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// BulkSendResult
// =============================================================================

/// Aggregate of a sequential bulk send through one gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendResult {
    /// True when every message was accepted.
    pub success: bool,
    pub total_sent: usize,
    pub total_failed: usize,
    /// One entry per input message, in input order.
    pub results: Vec<SendResult>,
    pub gateway: GatewayKind,
}

impl BulkSendResult {
    /// Build the aggregate from ordered per-message results.
    pub fn from_results(gateway: GatewayKind, results: Vec<SendResult>) -> Self {
        let total_sent = results.iter().filter(|r| r.success).count();
        let total_failed = results.len() - total_sent;
        Self {
            success: total_failed == 0,
            total_sent,
            total_failed,
            results,
            gateway,
        }
    }
}

// =============================================================================
// DeliveryStatus
// =============================================================================

/// Canonical delivery states every provider vocabulary is mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    #[default]
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl Display for DeliveryState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Sent => "sent",
            DeliveryState::Delivered => "delivered",
            DeliveryState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Delivery status of a previously sent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    pub message_id: String,
    pub status: DeliveryState,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivered_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryStatus {
    /// Status with no delivery time or error.
    pub fn new(message_id: impl Into<String>, status: DeliveryState) -> Self {
        Self {
            message_id: message_id.into(),
            status,
            delivered_at: None,
            error: None,
        }
    }
}

// =============================================================================
// Balance
// =============================================================================

/// Account balance reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub credits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl Balance {
    /// Balance observed now.
    pub fn now(credits: f64, currency: Option<String>) -> Self {
        Self {
            credits,
            currency,
            last_updated: OffsetDateTime::now_utc(),
        }
    }
}
