//! [`Gateway`] implementation for BulkSMS.

use super::client::BulkSms;
use crate::gateways::error::GatewayError;
use crate::gateways::traits::Gateway;
use crate::types::{Balance, DeliveryStatus, GatewayKind, Message, SendResult};
use crate::utils::phone::is_valid_sender_id;

impl Gateway for BulkSms {
    fn kind(&self) -> GatewayKind {
        GatewayKind::BulkSms
    }

    async fn send_single(&self, message: &Message) -> SendResult {
        match self.send_message(message).await {
            Ok(sent) => SendResult::sent(self.kind(), sent.id, sent.credit_cost),
            Err(e) => e.into_send_result(self.kind()),
        }
    }

    async fn get_balance(&self) -> Result<Balance, GatewayError> {
        let profile = self.get_profile().await?;
        Ok(Balance::now(profile.credits.balance, Some("credits".to_string())))
    }

    async fn get_status(&self, message_id: &str) -> Result<DeliveryStatus, GatewayError> {
        let message = self.get_message(message_id).await?;
        let mut status = DeliveryStatus::new(message.id, message.status.state());
        status.error = message.status.subtype;
        Ok(status)
    }

    async fn validate_sender_id(&self, sender_id: &str) -> bool {
        is_valid_sender_id(sender_id)
    }

    fn is_configured(&self) -> bool {
        self.has_credentials()
    }

    async fn test_connection(&self) -> bool {
        self.get_profile().await.is_ok()
    }
}
