//! [`Gateway`] implementation for Africa's Talking.

use super::client::AfricasTalking;
use super::types::parse_amount;
use crate::gateways::error::GatewayError;
use crate::gateways::traits::Gateway;
use crate::types::{Balance, DeliveryState, DeliveryStatus, GatewayKind, Message, SendResult};
use crate::utils::phone::is_valid_sender_id;

impl Gateway for AfricasTalking {
    fn kind(&self) -> GatewayKind {
        GatewayKind::AfricasTalking
    }

    async fn send_single(&self, message: &Message) -> SendResult {
        match self.send_message(message).await {
            Ok(recipient) => {
                let cost = recipient.cost_amount();
                SendResult::sent(self.kind(), recipient.message_id, cost)
            }
            Err(e) => e.into_send_result(self.kind()),
        }
    }

    async fn get_balance(&self) -> Result<Balance, GatewayError> {
        let user = self.get_user().await?;
        let (currency, credits) =
            parse_amount(&user.balance).ok_or_else(|| GatewayError::UnexpectedResponse {
                raw: user.balance.clone(),
            })?;
        Ok(Balance::now(credits, currency))
    }

    // Delivery reports arrive on a callback URL only.
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
        self.get_user().await.is_ok()
    }
}
