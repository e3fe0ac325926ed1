//! Closed sum over the built-in gateway adapters.

use super::africastalking::AfricasTalking;
use super::bulkgate::BulkGate;
use super::bulksms::BulkSms;
use super::error::GatewayError;
use super::routee::Routee;
use super::traits::Gateway;
use crate::types::{Balance, BulkSendResult, DeliveryStatus, GatewayKind, Message, SendResult};

/// Any of the built-in gateways, so one registry can hold all of them.
#[derive(Debug, Clone)]
pub enum AnyGateway {
    BulkSms(BulkSms),
    BulkGate(BulkGate),
    Routee(Routee),
    AfricasTalking(AfricasTalking),
}

macro_rules! delegate {
    ($self:ident, $gateway:ident => $call:expr) => {
        match $self {
            AnyGateway::BulkSms($gateway) => $call,
            AnyGateway::BulkGate($gateway) => $call,
            AnyGateway::Routee($gateway) => $call,
            AnyGateway::AfricasTalking($gateway) => $call,
        }
    };
}

impl Gateway for AnyGateway {
    fn kind(&self) -> GatewayKind {
        delegate!(self, g => g.kind())
    }

    async fn send_single(&self, message: &Message) -> SendResult {
        delegate!(self, g => g.send_single(message).await)
    }

    async fn send_bulk(&self, messages: &[Message]) -> BulkSendResult {
        delegate!(self, g => g.send_bulk(messages).await)
    }

    async fn get_balance(&self) -> Result<Balance, GatewayError> {
        delegate!(self, g => g.get_balance().await)
    }

    async fn get_status(&self, message_id: &str) -> Result<DeliveryStatus, GatewayError> {
        delegate!(self, g => g.get_status(message_id).await)
    }

    async fn validate_sender_id(&self, sender_id: &str) -> bool {
        delegate!(self, g => g.validate_sender_id(sender_id).await)
    }

    fn is_configured(&self) -> bool {
        delegate!(self, g => g.is_configured())
    }

    async fn test_connection(&self) -> bool {
        delegate!(self, g => g.test_connection().await)
    }
}

impl From<BulkSms> for AnyGateway {
    fn from(gateway: BulkSms) -> Self {
        AnyGateway::BulkSms(gateway)
    }
}

impl From<BulkGate> for AnyGateway {
    fn from(gateway: BulkGate) -> Self {
        AnyGateway::BulkGate(gateway)
    }
}

impl From<Routee> for AnyGateway {
    fn from(gateway: Routee) -> Self {
        AnyGateway::Routee(gateway)
    }
}

impl From<AfricasTalking> for AnyGateway {
    fn from(gateway: AfricasTalking) -> Self {
        AnyGateway::AfricasTalking(gateway)
    }
}
