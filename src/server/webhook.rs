//! Webhook endpoint handler.
//!
//! Validates GitHub webhook deliveries, decodes them into typed events and
//! relays them to Discord before answering GitHub.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{signature, AppState};
use crate::common::error::{EventError, RelayError};
use crate::common::DeliveryId;
use crate::relay::{GitHubEvent, RelayOutcome};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    /// Signature missing or not matching the configured secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body does not have the shape of its event.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Relaying to Discord failed.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebhookError::MissingHeader(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WebhookError::InvalidSignature => (StatusCode::UNAUTHORIZED, self.to_string()),
            WebhookError::InvalidJson(_) | WebhookError::Event(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid payload structure".to_string(),
            ),
            WebhookError::Relay(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing webhook".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-GitHub-Event` (required): event type, e.g. `push`
///   - `X-GitHub-Delivery` (optional): delivery id used for deduplication
///   - `X-Hub-Signature-256`: required only when a webhook secret is configured
/// - Body: JSON webhook payload containing a `repository` object
///
/// # Response
///
/// - 200 OK: message sent, or delivery already processed
/// - 400 Bad Request: missing event header or malformed payload
/// - 401 Unauthorized: signature missing or invalid
/// - 500 Internal Server Error: Discord delivery failed
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    if let Some(secret) = state.webhook_secret() {
        let valid = header_value(&headers, HEADER_SIGNATURE)
            .map(|sig| signature::verify(secret, &body, sig))
            .unwrap_or(false);
        if !valid {
            warn!("Rejecting webhook with missing or invalid signature");
            return Err(WebhookError::InvalidSignature);
        }
    }

    let Some(event_type) =
        header_value(&headers, HEADER_EVENT).filter(|v| !v.trim().is_empty())
    else {
        warn!("Missing x-github-event header");
        return Err(WebhookError::MissingHeader(HEADER_EVENT));
    };

    let delivery = header_value(&headers, HEADER_DELIVERY).and_then(DeliveryId::parse);
    let delivery_label = delivery
        .as_ref()
        .map(DeliveryId::to_string)
        .unwrap_or_else(|| "none".to_string());

    debug!(delivery = %delivery_label, event = %event_type, "Received webhook");

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(delivery = %delivery_label, error = %e, "Webhook body is not valid JSON");
        e
    })?;

    let event = GitHubEvent::from_payload(event_type, &payload).map_err(|e| {
        warn!(delivery = %delivery_label, event = %event_type, error = %e, "Invalid payload structure");
        e
    })?;

    info!(
        delivery = %delivery_label,
        event = %event_type,
        repo = %event.repository_name(),
        "Received event from repository"
    );

    match state.relay().handle(delivery.as_ref(), &event).await {
        Ok(RelayOutcome::Delivered { .. }) => Ok((StatusCode::OK, "Webhook processed")),
        Ok(RelayOutcome::Duplicate) => Ok((StatusCode::OK, "Already processed")),
        Err(e) => {
            error!(delivery = %delivery_label, event = %event_type, error = %e, "Error processing webhook");
            Err(WebhookError::Relay(e))
        }
    }
}

/// Extracts a header value as a string, if present and valid UTF-8.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
