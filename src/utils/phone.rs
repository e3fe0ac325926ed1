//! Phone number and sender ID helpers.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-().]").expect("separator pattern is invalid"));

static SENDER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,11}$").expect("sender id pattern is invalid"));

/// Strip spaces, dashes, dots and parentheses from a phone number.
pub fn normalize_phone(phone: &str) -> String {
    SEPARATORS.replace_all(phone.trim(), "").into_owned()
}

/// Convert a phone number to E.164 using `default_dial_code` when it carries
/// no international prefix.
///
/// ```rust
/// use sms_dispatch::utils::phone::to_e164;
///
/// assert_eq!(to_e164("923 456 789", "244"), "+244923456789");
/// assert_eq!(to_e164("00351911222333", "244"), "+351911222333");
/// assert_eq!(to_e164("+351911222333", "244"), "+351911222333");
/// ```
pub fn to_e164(phone: &str, default_dial_code: &str) -> String {
    let n = normalize_phone(phone);
    if n.starts_with('+') {
        return n;
    }
    if let Some(rest) = n.strip_prefix("00") {
        return format!("+{rest}");
    }
    if n.starts_with(default_dial_code) && n.len() > default_dial_code.len() + 8 {
        return format!("+{n}");
    }
    format!("+{default_dial_code}{}", n.trim_start_matches('0'))
}

/// Local sender ID check used by gateways without a sender ID lookup endpoint:
/// alphanumeric, 1 to 11 characters.
pub fn is_valid_sender_id(sender_id: &str) -> bool {
    SENDER_ID.is_match(sender_id)
}
