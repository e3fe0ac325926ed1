//! Wire types for the Africa's Talking messaging API.

use serde::{Deserialize, Serialize};

/// Form body of `POST /messaging`.
#[derive(Debug, Serialize)]
pub(crate) struct SendForm<'a> {
    pub username: &'a str,
    pub to: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<&'a str>,
}

/// Query of `GET /user`.
#[derive(Debug, Serialize)]
pub(crate) struct UserQuery<'a> {
    pub username: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendResponse {
    #[serde(rename = "SMSMessageData")]
    pub data: SmsMessageData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsMessageData {
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Recipients", default)]
    pub recipients: Vec<Recipient>,
}

/// Per-recipient outcome.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub status_code: u16,
    pub number: String,
    /// `"Success"` or a failure keyword such as `"InsufficientBalance"`.
    pub status: String,
    /// Amount with currency prefix, e.g. `"KES 0.8000"`.
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub message_id: String,
}

impl Recipient {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Numeric part of `cost`, if any.
    pub fn cost_amount(&self) -> Option<f64> {
        parse_amount(&self.cost).map(|(_, amount)| amount)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "UserData")]
    pub user_data: UserData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserData {
    /// Balance with currency prefix, e.g. `"KES 1785.50"`.
    pub balance: String,
}

/// Split `"KES 1785.50"` into currency and amount. A bare number has no
/// currency.
pub(crate) fn parse_amount(value: &str) -> Option<(Option<String>, f64)> {
    let value = value.trim();
    match value.rsplit_once(' ') {
        Some((currency, amount)) => {
            let amount = amount.trim().parse().ok()?;
            let currency = currency.trim();
            Some(((!currency.is_empty()).then(|| currency.to_string()), amount))
        }
        None => value.parse().ok().map(|amount| (None, amount)),
    }
}
