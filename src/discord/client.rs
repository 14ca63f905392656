//! Discord webhook delivery.
//!
//! Posts composed messages to a Discord "execute webhook" endpoint, targeting
//! a thread through the `thread_id` query parameter. Delivery is a single
//! attempt; GitHub's own redelivery is the only retry mechanism.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::{Message, ThreadId};

/// Sends a composed message to a destination thread.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    async fn deliver(&self, thread: &ThreadId, message: &Message) -> DeliveryResult<()>;
}

/// Delivery through a Discord webhook URL.
#[derive(Debug, Clone)]
pub struct DiscordWebhookClient {
    http: reqwest::Client,
    webhook_url: Url,
}

impl DiscordWebhookClient {
    /// Create a client for `webhook_url` with a per-request timeout.
    pub fn new(webhook_url: &str, timeout: Duration) -> DeliveryResult<Self> {
        let webhook_url = Url::parse(webhook_url).map_err(|e| DeliveryError::InvalidEndpoint {
            url: webhook_url.to_string(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hookrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, webhook_url })
    }

    /// Endpoint for a given thread.
    pub fn thread_url(&self, thread: &ThreadId) -> Url {
        let mut url = self.webhook_url.clone();
        url.query_pairs_mut().append_pair("thread_id", thread.as_str());
        url
    }
}

#[async_trait]
impl DeliveryClient for DiscordWebhookClient {
    async fn deliver(&self, thread: &ThreadId, message: &Message) -> DeliveryResult<()> {
        let url = self.thread_url(thread);
        debug!(thread = %thread, embeds = message.embeds.len(), "Posting message to Discord");

        let response = self.http.post(url).json(message).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
