//! Africa's Talking gateway.

pub mod client;
mod gateway;
pub mod types;

pub use client::{AfricasTalking, AfricasTalkingBuilder};
