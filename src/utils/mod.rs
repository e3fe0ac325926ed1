//! Shared helpers.

pub mod http;
pub mod phone;
