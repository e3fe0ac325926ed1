//! Gateway trait definition.

use super::error::GatewayError;
use crate::types::{Balance, BulkSendResult, DeliveryStatus, GatewayKind, Message, SendResult};
use std::future::Future;

/// Capability set every SMS gateway adapter implements.
///
/// `send_single` never fails: provider and network errors are folded into a
/// `SendResult` with `success == false`, so callers always get a record of
/// what happened. Diagnostic calls (`get_balance`, `get_status`) return
/// `Result` because their failure is informational only.
///
/// # Note on async methods
///
/// All async methods in this trait return `Send` futures, making them
/// compatible with multi-threaded executors.
///
/// # Example
///
/// ```rust,ignore
/// use sms_dispatch::{Gateway, GatewayKind, Message, SendResult};
///
/// #[derive(Clone)]
/// struct MyGateway { /* ... */ }
///
/// impl Gateway for MyGateway {
///     fn kind(&self) -> GatewayKind {
///         GatewayKind::BulkSms
///     }
///
///     async fn send_single(&self, message: &Message) -> SendResult {
///         // Call the provider and convert its answer
///     }
///
///     // ...
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait Gateway: Send + Sync + Clone {
    /// Which provider this adapter talks to.
    fn kind(&self) -> GatewayKind;

    /// Send one message.
    fn send_single(&self, message: &Message) -> impl Future<Output = SendResult> + Send;

    /// Send messages one after another, never concurrently.
    ///
    /// `results[i]` always corresponds to `messages[i]`.
    fn send_bulk(&self, messages: &[Message]) -> impl Future<Output = BulkSendResult> + Send {
        async move {
            let mut results = Vec::with_capacity(messages.len());
            for message in messages {
                results.push(self.send_single(message).await);
            }
            BulkSendResult::from_results(self.kind(), results)
        }
    }

    /// Fetch the account balance.
    fn get_balance(&self) -> impl Future<Output = Result<Balance, GatewayError>> + Send;

    /// Fetch the delivery status of a sent message.
    ///
    /// Provider values that do not map to a canonical state are reported as
    /// pending, never as failed.
    fn get_status(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<DeliveryStatus, GatewayError>> + Send;

    /// Check whether the provider would accept `sender_id`.
    fn validate_sender_id(&self, sender_id: &str) -> impl Future<Output = bool> + Send;

    /// True when every required credential is present. Performs no I/O.
    fn is_configured(&self) -> bool;

    /// Make a cheap authenticated call to confirm the credentials work.
    fn test_connection(&self) -> impl Future<Output = bool> + Send;
}
