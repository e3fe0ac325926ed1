//! SMS provider adapters.
//!
//! Each adapter is an HTTP client for one provider plus a [`Gateway`]
//! implementation that translates its responses into the canonical types.

pub mod africastalking;
mod any;
pub mod bulkgate;
pub mod bulksms;
pub mod error;
mod response;
pub mod routee;
mod traits;

pub use africastalking::AfricasTalking;
pub use any::AnyGateway;
pub use bulkgate::BulkGate;
pub use bulksms::BulkSms;
pub use error::GatewayError;
pub use routee::Routee;
pub use traits::Gateway;
