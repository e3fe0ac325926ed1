//! [`Gateway`] implementation for BulkGate.

use super::client::BulkGate;
use crate::gateways::error::GatewayError;
use crate::gateways::traits::Gateway;
use crate::types::{Balance, DeliveryState, DeliveryStatus, GatewayKind, Message, SendResult};
use crate::utils::phone::is_valid_sender_id;

impl Gateway for BulkGate {
    fn kind(&self) -> GatewayKind {
        GatewayKind::BulkGate
    }

    async fn send_single(&self, message: &Message) -> SendResult {
        match self.send_transactional(message).await {
            Ok(sent) => SendResult::sent(self.kind(), sent.sms_id, sent.price),
            Err(e) => e.into_send_result(self.kind()),
        }
    }

    async fn get_balance(&self) -> Result<Balance, GatewayError> {
        let info = self.get_info().await?;
        Ok(Balance::now(info.credit, info.currency))
    }

    // BulkGate pushes delivery reports to a webhook and has no lookup call.
    async fn get_status(&self, message_id: &str) -> Result<DeliveryStatus, GatewayError> {
        Ok(DeliveryStatus::new(message_id, DeliveryState::Pending))
    }

    async fn validate_sender_id(&self, sender_id: &str) -> bool {
        is_valid_sender_id(sender_id)
    }

    fn is_configured(&self) -> bool {
        self.has_credentials()
    }

    async fn test_connection(&self) -> bool {
        self.get_info().await.is_ok()
    }
}
