//! Single-hop fallback engine.

use super::classifier::FailureClassifier;
use super::error::DispatchError;
use super::policy::{DispatchPolicy, Selection};
use super::registry::GatewayRegistry;
use crate::gateways::{AnyGateway, Gateway};
use crate::routing::RoutingTable;
use crate::types::{GatewayKind, Message, SendResult};
use serde::Serialize;
use time::OffsetDateTime;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// One provider call (or skipped call) made for a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub gateway: GatewayKind,
    pub result: SendResult,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Attempt {
    fn now(result: SendResult) -> Self {
        Self {
            gateway: result.gateway,
            result,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Outcome of dispatching one message, with its full attempt trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResult {
    pub final_result: SendResult,
    /// Chronological; at most two entries.
    pub attempts: Vec<Attempt>,
    pub fallback_used: bool,
}

impl FallbackResult {
    /// The last `limit` attempts, oldest first. The trail itself is kept
    /// whole.
    pub fn latest_attempts(&self, limit: usize) -> &[Attempt] {
        let start = self.attempts.len().saturating_sub(limit);
        &self.attempts[start..]
    }

    /// Result of the first hop.
    pub fn primary_result(&self) -> &SendResult {
        self.attempts
            .first()
            .map_or(&self.final_result, |attempt| &attempt.result)
    }
}

/// Outcome of a sequential batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFallbackResult {
    pub results: Vec<FallbackResult>,
    pub total_sent: usize,
    pub total_failed: usize,
    /// Messages for which the fallback hop was taken.
    pub fallback_count: usize,
}

/// Sends messages through a primary gateway and, on a retryable failure,
/// once more through a fallback gateway.
///
/// # Example
///
/// ```rust,no_run
/// use sms_dispatch::dispatch::{DispatchPolicy, FallbackEngine, GatewayRegistry};
/// use sms_dispatch::gateways::{AnyGateway, BulkGate, BulkSms};
/// use sms_dispatch::{GatewayKind, Message};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let gateways: GatewayRegistry<AnyGateway> = [
///     AnyGateway::from(BulkSms::with_credentials("id", "secret")?),
///     AnyGateway::from(BulkGate::with_api_key("key")?),
/// ]
/// .into_iter()
/// .collect();
///
/// let engine = FallbackEngine::builder(gateways)
///     .policy(DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate))
///     .build()?;
///
/// let outcome = engine
///     .send_with_fallback(&Message::new("+244923456789", "ACME", "Hello"))
///     .await?;
/// println!("delivered via {}", outcome.final_result.gateway);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FallbackEngine<G: Gateway = AnyGateway> {
    gateways: GatewayRegistry<G>,
    policy: DispatchPolicy,
    routing: RoutingTable,
    classifier: FailureClassifier,
}

/// Builder for [`FallbackEngine`].
#[derive(Debug)]
pub struct EngineBuilder<G: Gateway> {
    gateways: GatewayRegistry<G>,
    policy: Option<DispatchPolicy>,
    routing: RoutingTable,
    classifier: FailureClassifier,
}

impl<G: Gateway> EngineBuilder<G> {
    pub fn new(gateways: GatewayRegistry<G>) -> Self {
        Self {
            gateways,
            policy: None,
            routing: RoutingTable::default(),
            classifier: FailureClassifier::default(),
        }
    }

    /// Selection policy. Required.
    pub fn policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Routing table for the country policy.
    ///
    /// Default: [`RoutingTable::palop`]
    pub fn routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    pub fn classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the engine.
    ///
    /// A static policy's primary must be registered. Without an explicit
    /// policy the engine cannot be built.
    pub fn build(self) -> Result<FallbackEngine<G>, DispatchError> {
        let policy = self.policy.ok_or(DispatchError::NoPrimaryGateway)?;
        if let DispatchPolicy::Static { primary, .. } = policy
            && !self.gateways.contains(primary)
        {
            return Err(DispatchError::GatewayNotRegistered(primary));
        }

        Ok(FallbackEngine {
            gateways: self.gateways,
            policy,
            routing: self.routing,
            classifier: self.classifier,
        })
    }
}

impl<G: Gateway> FallbackEngine<G> {
    pub fn builder(gateways: GatewayRegistry<G>) -> EngineBuilder<G> {
        EngineBuilder::new(gateways)
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn gateways(&self) -> &GatewayRegistry<G> {
        &self.gateways
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn classifier(&self) -> &FailureClassifier {
        &self.classifier
    }

    /// Gateways the current policy would use for `to`.
    pub fn select(&self, to: &str) -> Result<(GatewayKind, Option<GatewayKind>), DispatchError> {
        let Selection { primary, fallback } = self.resolve(to)?;
        Ok((primary, fallback))
    }

    fn resolve(&self, to: &str) -> Result<Selection, DispatchError> {
        self.policy
            .select(to, &self.routing, |kind| self.gateways.contains(kind))
    }

    /// Send through one gateway, checking it first under the country policy.
    async fn hop(&self, kind: GatewayKind, message: &Message) -> SendResult {
        let Some(gateway) = self.gateways.get(kind) else {
            return SendResult::failed(
                kind,
                format!("Connection failed: {kind} is not registered"),
                None,
            );
        };

        if self.policy.checks_before_send() {
            if !gateway.is_configured() {
                return SendResult::failed(
                    kind,
                    format!("Connection failed: {kind} is not configured"),
                    None,
                );
            }
            if !gateway.test_connection().await {
                return SendResult::failed(
                    kind,
                    format!("Connection failed: {kind} rejected the connection test"),
                    None,
                );
            }
        }

        gateway.send_single(message).await
    }

    /// Dispatch one message with at most one fallback hop.
    ///
    /// Errors only when no gateway can be selected; every provider failure is
    /// part of the returned trail.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FallbackEngine::send_with_fallback", skip_all, fields(to = %message.to))
    )]
    pub async fn send_with_fallback(&self, message: &Message) -> Result<FallbackResult, DispatchError> {
        let Selection { primary, fallback } = self.resolve(&message.to)?;

        let primary_result = self.hop(primary, message).await;
        let mut attempts = vec![Attempt::now(primary_result.clone())];

        if primary_result.success {
            #[cfg(feature = "tracing")]
            debug!(gateway = %primary, "Sent on first attempt");

            return Ok(FallbackResult {
                final_result: primary_result,
                attempts,
                fallback_used: false,
            });
        }

        let retryable = self.classifier.is_retryable(&primary_result);

        let Some(fallback) = fallback.filter(|_| retryable) else {
            #[cfg(feature = "tracing")]
            warn!(
                gateway = %primary,
                retryable,
                error = primary_result.error_text(),
                "Send failed without fallback"
            );

            return Ok(FallbackResult {
                final_result: primary_result,
                attempts,
                fallback_used: false,
            });
        };

        #[cfg(feature = "tracing")]
        info!(
            from = %primary,
            to = %fallback,
            class = ?self.classifier.classify_result(&primary_result),
            "Falling back to secondary gateway"
        );

        let fallback_result = self.hop(fallback, message).await;
        attempts.push(Attempt::now(fallback_result.clone()));

        Ok(FallbackResult {
            final_result: fallback_result,
            attempts,
            fallback_used: true,
        })
    }

    /// Dispatch messages one after another, in input order.
    ///
    /// A message for which no gateway can be selected is recorded as a
    /// failed result with an empty attempt trail; the rest of the batch
    /// still goes out.
    pub async fn send_bulk_with_fallback(&self, messages: &[Message]) -> BulkFallbackResult {
        let mut bulk = BulkFallbackResult {
            results: Vec::with_capacity(messages.len()),
            ..Default::default()
        };

        for message in messages {
            let outcome = match self.send_with_fallback(message).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    warn!(to = %message.to, error = %e, "No gateway selected for message");

                    FallbackResult {
                        final_result: SendResult::failed(self.policy.lead(), e.to_string(), None),
                        attempts: Vec::new(),
                        fallback_used: false,
                    }
                }
            };
            if outcome.final_result.success {
                bulk.total_sent += 1;
            } else {
                bulk.total_failed += 1;
            }
            if outcome.fallback_used {
                bulk.fallback_count += 1;
            }
            bulk.results.push(outcome);
        }

        #[cfg(feature = "tracing")]
        info!(
            total = messages.len(),
            sent = bulk.total_sent,
            failed = bulk.total_failed,
            fallbacks = bulk.fallback_count,
            "Bulk dispatch finished"
        );

        bulk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::GatewayError;
    use crate::types::{Balance, DeliveryState, DeliveryStatus};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    enum Reply {
        Accept,
        Reject(&'static str, Option<u16>),
    }

    #[derive(Clone)]
    struct MockGateway {
        kind: GatewayKind,
        reply: Reply,
        configured: bool,
        connects: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockGateway {
        fn new(kind: GatewayKind, reply: Reply, calls: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                kind,
                reply,
                configured: true,
                connects: true,
                calls: Arc::clone(calls),
            }
        }

        fn log(&self, call: &str) {
            self.calls.lock().unwrap().push(format!("{}:{call}", self.kind));
        }
    }

    impl Gateway for MockGateway {
        fn kind(&self) -> GatewayKind {
            self.kind
        }

        async fn send_single(&self, message: &Message) -> SendResult {
            self.log("send");
            match self.reply {
                Reply::Accept => SendResult::sent(self.kind, format!("{}-{}", self.kind, message.to), Some(1.0)),
                Reply::Reject(error, status) => SendResult::failed(self.kind, error, status),
            }
        }

        async fn get_balance(&self) -> Result<Balance, GatewayError> {
            Ok(Balance::now(10.0, None))
        }

        async fn get_status(&self, message_id: &str) -> Result<DeliveryStatus, GatewayError> {
            Ok(DeliveryStatus::new(message_id, DeliveryState::Pending))
        }

        async fn validate_sender_id(&self, _sender_id: &str) -> bool {
            true
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn test_connection(&self) -> bool {
            self.log("test");
            self.connects
        }
    }

    fn calls() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn engine(
        gateways: Vec<MockGateway>,
        policy: DispatchPolicy,
    ) -> FallbackEngine<MockGateway> {
        FallbackEngine::builder(gateways.into_iter().collect())
            .policy(policy)
            .build()
            .unwrap()
    }

    fn static_policy() -> DispatchPolicy {
        DispatchPolicy::fixed(GatewayKind::BulkSms, Some(GatewayKind::Routee))
    }

    #[tokio::test]
    async fn test_primary_success_single_attempt() {
        let log = calls();
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Accept, &log),
                MockGateway::new(GatewayKind::Routee, Reply::Accept, &log),
            ],
            static_policy(),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("+351911222333", "ACME", "hi"))
            .await
            .unwrap();

        assert!(outcome.final_result.success);
        assert_eq!(outcome.attempts.len(), 1);
        assert!(!outcome.fallback_used);
        assert_eq!(*log.lock().unwrap(), ["bulksms:send"]);
    }

    #[tokio::test]
    async fn test_terminal_failure_no_fallback() {
        let log = calls();
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Reject("Invalid recipient", Some(400)), &log),
                MockGateway::new(GatewayKind::Routee, Reply::Accept, &log),
            ],
            static_policy(),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("+351911222333", "ACME", "hi"))
            .await
            .unwrap();

        assert!(!outcome.final_result.success);
        assert_eq!(outcome.attempts.len(), 1);
        assert!(!outcome.fallback_used);
        assert_eq!(&outcome.final_result, outcome.primary_result());
    }

    #[tokio::test]
    async fn test_retryable_failure_uses_fallback_even_if_it_fails() {
        let log = calls();
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Reject("Insufficient credits", None), &log),
                MockGateway::new(GatewayKind::Routee, Reply::Reject("Invalid recipient", Some(400)), &log),
            ],
            static_policy(),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("+351911222333", "ACME", "hi"))
            .await
            .unwrap();

        assert!(outcome.fallback_used);
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.final_result.gateway, GatewayKind::Routee);
        assert_eq!(outcome.final_result.error_text(), "Invalid recipient");
        assert_eq!(outcome.attempts[0].gateway, GatewayKind::BulkSms);
        assert!(outcome.attempts[0].timestamp <= outcome.attempts[1].timestamp);
    }

    #[tokio::test]
    async fn test_retryable_failure_without_fallback() {
        let log = calls();
        let engine = engine(
            vec![MockGateway::new(GatewayKind::BulkSms, Reply::Reject("Rate limit", Some(429)), &log)],
            DispatchPolicy::fixed(GatewayKind::BulkSms, None),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("+351911222333", "ACME", "hi"))
            .await
            .unwrap();
        assert_eq!(outcome.attempts.len(), 1);
        assert!(!outcome.fallback_used);
    }

    #[tokio::test]
    async fn test_country_policy_checks_before_send() {
        let log = calls();
        let mut bulkgate = MockGateway::new(GatewayKind::BulkGate, Reply::Accept, &log);
        bulkgate.connects = false;
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Accept, &log),
                bulkgate,
            ],
            DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("+244923456789", "ACME", "hi"))
            .await
            .unwrap();

        assert!(outcome.fallback_used);
        assert!(outcome.final_result.success);
        assert_eq!(outcome.final_result.gateway, GatewayKind::BulkSms);
        assert_eq!(
            outcome.attempts[0].result.error_text(),
            "Connection failed: bulkgate rejected the connection test"
        );
        assert_eq!(
            *log.lock().unwrap(),
            ["bulkgate:test", "bulksms:test", "bulksms:send"]
        );
    }

    #[tokio::test]
    async fn test_country_policy_unconfigured_gateway_skips_io() {
        let log = calls();
        let mut bulkgate = MockGateway::new(GatewayKind::BulkGate, Reply::Accept, &log);
        bulkgate.configured = false;
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Accept, &log),
                bulkgate,
            ],
            DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate),
        );

        let outcome = engine
            .send_with_fallback(&Message::new("923456789", "ACME", "hi"))
            .await
            .unwrap();

        assert_eq!(
            outcome.attempts[0].result.error_text(),
            "Connection failed: bulkgate is not configured"
        );
        assert!(!log.lock().unwrap().iter().any(|call| call.starts_with("bulkgate")));
    }

    #[tokio::test]
    async fn test_bulk_preserves_order_and_counts() {
        let log = calls();
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Accept, &log),
                MockGateway::new(GatewayKind::BulkGate, Reply::Reject("Insufficient credits", Some(402)), &log),
            ],
            DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate),
        );

        let messages = [
            Message::new("+244923456789", "ACME", "1"),
            Message::new("+351911222333", "ACME", "2"),
            Message::new("+258841234567", "ACME", "3"),
        ];
        let bulk = engine.send_bulk_with_fallback(&messages).await;

        assert_eq!(bulk.results.len(), 3);
        assert_eq!(bulk.total_sent, 3);
        assert_eq!(bulk.total_failed, 0);
        assert_eq!(bulk.fallback_count, 1);
        assert_eq!(
            bulk.results[0].final_result.message_id.as_deref(),
            Some("bulksms-+244923456789")
        );
        assert_eq!(
            bulk.results[2].final_result.message_id.as_deref(),
            Some("bulksms-+258841234567")
        );
    }

    fn kenya_prefers_routee() -> RoutingTable {
        RoutingTable::builder(keshvar::Alpha2::KE)
            .country(keshvar::Alpha2::KE, "+254", GatewayKind::Routee, 1.0)
            .default_gateway(GatewayKind::BulkGate)
            .build()
    }

    #[tokio::test]
    async fn test_unregistered_preference_uses_registered_pair_member() {
        let log = calls();
        let engine = FallbackEngine::builder(
            [MockGateway::new(GatewayKind::AfricasTalking, Reply::Accept, &log)]
                .into_iter()
                .collect(),
        )
        .policy(DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::AfricasTalking))
        .routing(kenya_prefers_routee())
        .build()
        .unwrap();

        let outcome = engine
            .send_with_fallback(&Message::new("+254711000000", "ACME", "hi"))
            .await
            .unwrap();

        assert!(outcome.final_result.success);
        assert_eq!(outcome.final_result.gateway, GatewayKind::AfricasTalking);
        assert_eq!(*log.lock().unwrap(), ["africastalking:test", "africastalking:send"]);
    }

    #[tokio::test]
    async fn test_bulk_keeps_earlier_sends_when_a_message_has_no_gateway() {
        let log = calls();
        let engine = FallbackEngine::builder(
            [MockGateway::new(GatewayKind::Routee, Reply::Accept, &log)]
                .into_iter()
                .collect(),
        )
        .policy(DispatchPolicy::country(GatewayKind::BulkSms, GatewayKind::BulkGate))
        .routing(kenya_prefers_routee())
        .build()
        .unwrap();

        let messages = [
            Message::new("+254711000000", "ACME", "1"),
            Message::new("+351911222333", "ACME", "2"),
            Message::new("+254722000000", "ACME", "3"),
        ];
        let bulk = engine.send_bulk_with_fallback(&messages).await;

        assert_eq!(bulk.results.len(), 3);
        assert_eq!(bulk.total_sent, 2);
        assert_eq!(bulk.total_failed, 1);
        assert_eq!(
            bulk.results[0].final_result.message_id.as_deref(),
            Some("routee-+254711000000")
        );

        let unsent = &bulk.results[1];
        assert!(!unsent.final_result.success);
        assert!(unsent.attempts.is_empty());
        assert!(unsent.final_result.error_text().starts_with("No gateway available"));

        assert_eq!(
            bulk.results[2].final_result.message_id.as_deref(),
            Some("routee-+254722000000")
        );
        assert_eq!(
            log.lock().unwrap().iter().filter(|call| call.ends_with(":send")).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_latest_attempts() {
        let log = calls();
        let engine = engine(
            vec![
                MockGateway::new(GatewayKind::BulkSms, Reply::Reject("timeout", None), &log),
                MockGateway::new(GatewayKind::Routee, Reply::Accept, &log),
            ],
            static_policy(),
        );
        let outcome = engine
            .send_with_fallback(&Message::new("+351911222333", "ACME", "hi"))
            .await
            .unwrap();

        assert_eq!(outcome.latest_attempts(1).len(), 1);
        assert_eq!(outcome.latest_attempts(1)[0].gateway, GatewayKind::Routee);
        assert_eq!(outcome.latest_attempts(10).len(), 2);
        assert_eq!(outcome.attempts.len(), 2);
    }

    #[test]
    fn test_build_requires_policy_and_registered_primary() {
        let log = calls();
        let registry: GatewayRegistry<MockGateway> =
            [MockGateway::new(GatewayKind::BulkSms, Reply::Accept, &log)].into_iter().collect();

        assert!(matches!(
            FallbackEngine::builder(registry.clone()).build(),
            Err(DispatchError::NoPrimaryGateway)
        ));
        assert!(matches!(
            FallbackEngine::builder(registry)
                .policy(DispatchPolicy::fixed(GatewayKind::Routee, None))
                .build(),
            Err(DispatchError::GatewayNotRegistered(GatewayKind::Routee))
        ));
    }
}
