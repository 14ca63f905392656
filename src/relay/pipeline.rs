//! Relay pipeline: dedup, route, format, deliver.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::common::error::RelayError;
use crate::common::{DeliveryId, ThreadId};
use crate::discord::DeliveryClient;
use crate::relay::dedup::DeliveryDedup;
use crate::relay::events::GitHubEvent;
use crate::relay::formatter::EventFormatter;
use crate::relay::router::RepoRouter;

/// Result of relaying one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The message was posted to `thread`.
    Delivered { thread: ThreadId },
    /// The delivery id was already processed; nothing was sent.
    Duplicate,
}

/// Everything needed to relay an event, shared across requests.
pub struct Relay {
    router: RepoRouter,
    formatter: EventFormatter,
    dedup: Arc<dyn DeliveryDedup>,
    client: Arc<dyn DeliveryClient>,
}

impl Relay {
    pub fn new(
        router: RepoRouter,
        formatter: EventFormatter,
        dedup: Arc<dyn DeliveryDedup>,
        client: Arc<dyn DeliveryClient>,
    ) -> Self {
        Self {
            router,
            formatter,
            dedup,
            client,
        }
    }

    pub fn router(&self) -> &RepoRouter {
        &self.router
    }

    /// Relay a webhook delivery.
    ///
    /// Deliveries without an id are never treated as duplicates. A failed
    /// delivery is forgotten again so that GitHub's redelivery is processed.
    ///
    /// Best effort only: a redelivery arriving while the first attempt is
    /// still in flight is answered as a duplicate, and is not retried if that
    /// first attempt then fails.
    pub async fn handle(
        &self,
        delivery: Option<&DeliveryId>,
        event: &GitHubEvent,
    ) -> Result<RelayOutcome, RelayError> {
        if let Some(id) = delivery {
            if !self.dedup.check_and_record(id) {
                info!(delivery = %id, event = event.event_type(), "Skipping already processed delivery");
                return Ok(RelayOutcome::Duplicate);
            }
        }

        match self.send(event).await {
            Ok(thread) => Ok(RelayOutcome::Delivered { thread }),
            Err(e) => {
                if let Some(id) = delivery {
                    self.dedup.forget(id);
                }
                Err(e)
            }
        }
    }

    /// Route, format and deliver an event without duplicate detection.
    pub async fn send(&self, event: &GitHubEvent) -> Result<ThreadId, RelayError> {
        let repo = event.repository_name();
        let thread = self.router.resolve_destination(repo).clone();
        let message = self.formatter.format(event);

        debug!(
            event = event.event_type(),
            repo = %repo,
            thread = %thread,
            title = message.embeds.first().map(|e| e.title.as_str()).unwrap_or(""),
            "Formatted event"
        );

        match self.client.deliver(&thread, &message).await {
            Ok(()) => {
                info!(event = event.event_type(), repo = %repo, thread = %thread, "Sent message to Discord thread");
                Ok(thread)
            }
            Err(source) => {
                error!(event = event.event_type(), repo = %repo, thread = %thread, error = %source, "Failed to send message to Discord");
                Err(RelayError::Delivery {
                    thread: thread.to_string(),
                    source,
                })
            }
        }
    }
}
