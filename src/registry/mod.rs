//! Gateway configuration records and the single-primary config set.

mod config;
mod set;

pub use config::{AuthType, GatewayConfig};
pub use set::GatewayConfigSet;
