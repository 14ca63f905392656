//! Discord integration.

pub mod client;

pub use client::{DeliveryClient, DiscordWebhookClient};
