//! BulkGate gateway (Simple transactional API).

pub mod client;
mod gateway;
pub mod types;

pub use client::{BulkGate, BulkGateBuilder};
