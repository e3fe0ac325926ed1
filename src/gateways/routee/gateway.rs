//! [`Gateway`] implementation for Routee.

use super::client::Routee;
use crate::gateways::error::GatewayError;
use crate::gateways::traits::Gateway;
use crate::types::{Balance, DeliveryState, DeliveryStatus, GatewayKind, Message, SendResult};
use crate::utils::phone::is_valid_sender_id;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

impl Gateway for Routee {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Routee
    }

    async fn send_single(&self, message: &Message) -> SendResult {
        match self.send_sms(message).await {
            Ok(sent) => {
                let parts = sent.body_analysis.map(|analysis| f64::from(analysis.parts));
                SendResult::sent(self.kind(), sent.tracking_id, parts)
            }
            Err(e) => e.into_send_result(self.kind()),
        }
    }

    async fn get_balance(&self) -> Result<Balance, GatewayError> {
        let balance = self.balance().await?;
        Ok(Balance::now(
            balance.balance,
            balance.currency.map(|currency| currency.code),
        ))
    }

    async fn get_status(&self, message_id: &str) -> Result<DeliveryStatus, GatewayError> {
        let entry = self.track(message_id).await?;
        let state = entry.state();
        let mut status = DeliveryStatus::new(entry.message_id, state);
        if state == DeliveryState::Delivered {
            status.delivered_at = entry
                .updated_at
                .as_deref()
                .and_then(|at| OffsetDateTime::parse(at, &Rfc3339).ok());
        }
        if state == DeliveryState::Failed {
            status.error = Some(entry.status);
        }
        Ok(status)
    }

    async fn validate_sender_id(&self, sender_id: &str) -> bool {
        is_valid_sender_id(sender_id)
    }

    fn is_configured(&self) -> bool {
        self.has_credentials()
    }

    async fn test_connection(&self) -> bool {
        self.authenticate().await.is_ok()
    }
}
