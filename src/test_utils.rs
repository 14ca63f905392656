//! Shared test fixtures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::{Message, ThreadId};
use crate::discord::DeliveryClient;
use crate::relay::RepoRouter;

/// Delivery client that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<(ThreadId, Message)>>,
    failing: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose deliveries fail with a 500 from "Discord".
    pub fn failing() -> Self {
        let client = Self::default();
        client.set_failing(true);
        client
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(ThreadId, Message)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryClient for RecordingClient {
    async fn deliver(&self, thread: &ThreadId, message: &Message) -> DeliveryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((thread.clone(), message.clone()));
        Ok(())
    }
}

/// `ollim-web` -> 111 (default), `ollim-app` -> 222.
pub fn test_router() -> RepoRouter {
    RepoRouter::new(
        vec![
            ("ollim-web".to_string(), ThreadId::new("111")),
            ("ollim-app".to_string(), ThreadId::new("222")),
        ],
        "ollim-web",
        ThreadId::new("111"),
    )
}
