//! Basic dispatch example.
//!
//! Builds BulkSMS and BulkGate gateways from environment credentials and sends
//! one message with country routing and fallback.
//!
//! # Running
//!
//! ```bash
//! BULKSMS_TOKEN_ID=... BULKSMS_TOKEN_SECRET=... BULKGATE_API_KEY=... \
//!     cargo run --example basic_dispatch -- +244923456789 "Ola!"
//! ```
//!
//! **WARNING**: This sends a real SMS and consumes credits.

use sms_dispatch::dispatch::{DispatchPolicy, FallbackEngine};
use sms_dispatch::factory::{Credentials, GatewayFactory};
use sms_dispatch::registry::GatewayConfig;
use sms_dispatch::{Gateway, GatewayKind, HttpSettings, Message};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let to = args.next().unwrap_or_else(|| "+244923456789".to_string());
    let text = args.next().unwrap_or_else(|| "Hello from sms-dispatch".to_string());
    let sender = env::var("SMS_SENDER_ID").unwrap_or_else(|_| "INFO".to_string());

    let credentials = BTreeMap::from([
        (
            GatewayKind::BulkSms,
            Credentials::new()
                .with("tokenId", env::var("BULKSMS_TOKEN_ID")?)
                .with("tokenSecret", env::var("BULKSMS_TOKEN_SECRET")?),
        ),
        (
            GatewayKind::BulkGate,
            Credentials::new().with("apiKey", env::var("BULKGATE_API_KEY")?),
        ),
    ]);
    let configs = [
        GatewayConfig::new(GatewayKind::BulkSms),
        GatewayConfig::new(GatewayKind::BulkGate),
    ];

    // Shorter limits than the 30s/10s defaults
    let factory = GatewayFactory::new(
        HttpSettings::default()
            .with_timeout(Duration::from_secs(15))
            .with_connect_timeout(Duration::from_secs(5)),
    );
    let gateways = factory.build_registry(&configs, &credentials)?;

    for gateway in gateways.iter() {
        let report = GatewayFactory::test_gateway(gateway).await;
        println!("{}: {report:?}", gateway.kind());
    }

    let engine = FallbackEngine::builder(gateways)
        .policy(DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate))
        .build()?;

    let (primary, fallback) = engine.select(&to)?;
    println!("Routing {to}: primary {primary}, fallback {fallback:?}");

    let outcome = engine
        .send_with_fallback(&Message::new(to, sender, text))
        .await?;

    for (i, attempt) in outcome.attempts.iter().enumerate() {
        println!(
            "  #{} {} at {}: {}",
            i + 1,
            attempt.gateway,
            attempt.timestamp,
            if attempt.result.success {
                format!("sent ({})", attempt.result.message_id.as_deref().unwrap_or("-"))
            } else {
                format!("failed ({})", attempt.result.error_text())
            }
        );
    }
    println!(
        "Final: success={} fallback_used={}",
        outcome.final_result.success, outcome.fallback_used
    );

    Ok(())
}
