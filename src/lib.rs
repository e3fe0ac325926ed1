//! # SMS Dispatch
//!
//! Multi-gateway SMS delivery core with country routing and single-hop
//! provider fallback.
//!
//! Four provider APIs are normalized behind the [`Gateway`] trait. The
//! [`FallbackEngine`](dispatch::FallbackEngine) picks a gateway per message,
//! either from a static primary/fallback pair or from the destination country,
//! and retries once through the other gateway when the first failure is
//! recoverable. Every attempt is returned to the caller.
//!
//! ## Supported Gateways
//!
//! | Gateway | Auth | Website |
//! |---------|------|---------|
//! | BulkSMS | HTTP Basic (token id/secret) | <https://www.bulksms.com> |
//! | BulkGate | Application token in body | <https://www.bulkgate.com> |
//! | Routee | OAuth2 client credentials | <https://www.routee.net> |
//! | Africa's Talking | `apiKey` header, form bodies | <https://africastalking.com> |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sms_dispatch::dispatch::{DispatchPolicy, FallbackEngine};
//! use sms_dispatch::factory::{Credentials, GatewayFactory};
//! use sms_dispatch::{GatewayKind, HttpSettings, Message};
//! use std::collections::BTreeMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = GatewayFactory::new(HttpSettings::default());
//!
//!     let credentials = BTreeMap::from([
//!         (
//!             GatewayKind::BulkSms,
//!             Credentials::new().with("tokenId", "id").with("tokenSecret", "secret"),
//!         ),
//!         (GatewayKind::BulkGate, Credentials::new().with("apiKey", "key")),
//!     ]);
//!     let configs = [
//!         sms_dispatch::registry::GatewayConfig::new(GatewayKind::BulkSms),
//!         sms_dispatch::registry::GatewayConfig::new(GatewayKind::BulkGate),
//!     ];
//!     let gateways = factory.build_registry(&configs, &credentials)?;
//!
//!     let engine = FallbackEngine::builder(gateways)
//!         .policy(DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate))
//!         .build()?;
//!
//!     let outcome = engine
//!         .send_with_fallback(&Message::new("+244923456789", "ACME", "Ola!"))
//!         .await?;
//!     println!(
//!         "{} after {} attempt(s)",
//!         if outcome.final_result.success { "sent" } else { "failed" },
//!         outcome.attempts.len()
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! FallbackEngine<G>
//!     │  DispatchPolicy (Static | Country) + RoutingTable + FailureClassifier
//!     ▼
//! GatewayRegistry<G>   (built by GatewayFactory from GatewayConfig records)
//!     │
//!     ▼
//!   Gateway            (trait: BulkSms, BulkGate, Routee, AfricasTalking)
//! ```
//!
//! ## Features
//!
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)

pub mod dispatch;
pub mod errors;
pub mod factory;
pub mod gateways;
pub mod registry;
pub mod routing;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use errors::{ConfigurationError, FailureClass, RetryableError};
pub use gateways::{AnyGateway, Gateway, GatewayError};
pub use types::{
    Balance, BulkSendResult, DeliveryState, DeliveryStatus, GatewayKind, Message, SendResult,
};
pub use utils::http::HttpSettings;
