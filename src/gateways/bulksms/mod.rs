//! BulkSMS gateway (bulksms.com JSON REST API).
//!
//! # Example
//!
//! ```rust,ignore
//! use sms_dispatch::gateways::bulksms::BulkSms;
//! use sms_dispatch::{Gateway, Message};
//!
//! let gateway = BulkSms::with_credentials("token_id", "token_secret")?;
//! let balance = gateway.get_balance().await?;
//! println!("{} credits left", balance.credits);
//! ```

pub mod client;
mod gateway;
pub mod types;

pub use client::{BulkSms, BulkSmsBuilder};
