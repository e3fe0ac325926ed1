//! Routee gateway (AMD Telecom), OAuth2 client credentials.

pub mod client;
mod gateway;
mod token;
pub mod types;

pub use client::{Routee, RouteeBuilder};
pub use token::EXPIRY_MARGIN;
