//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use types::{DeliveryId, Embed, EmbedAuthor, EmbedField, EmbedFooter, Message, ThreadId};
