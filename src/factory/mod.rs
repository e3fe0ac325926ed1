//! Credential validation and adapter construction.

mod builder;
mod credentials;

pub use builder::{GatewayFactory, GatewayTestReport, required_fields};
pub use credentials::Credentials;
