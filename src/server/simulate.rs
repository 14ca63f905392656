//! Manual verification endpoints.
//!
//! `GET /simulate-webhook?repo=<name>` and
//! `GET /simulate-issue?repo=<name>&action=<action>` build a synthetic event
//! and send it through the normal routing, formatting and delivery path.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{error, info};

use super::AppState;
use crate::relay::simulate::{simulated_issue, simulated_push};
use crate::relay::GitHubEvent;

/// Query parameters accepted by the simulation endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SimulateQuery {
    pub repo: Option<String>,
    pub action: Option<String>,
}

impl SimulateQuery {
    /// Requested repository, or the router's default repository.
    fn repo(&self, state: &AppState) -> String {
        self.repo
            .clone()
            .filter(|repo| !repo.is_empty())
            .unwrap_or_else(|| state.relay().router().default_repository().to_string())
    }
}

pub async fn simulate_webhook_handler(
    State(state): State<AppState>,
    Query(query): Query<SimulateQuery>,
) -> (StatusCode, String) {
    let repo = query.repo(&state);
    send_simulated(&state, &repo, simulated_push(&repo)).await
}

pub async fn simulate_issue_handler(
    State(state): State<AppState>,
    Query(query): Query<SimulateQuery>,
) -> (StatusCode, String) {
    let repo = query.repo(&state);
    send_simulated(&state, &repo, simulated_issue(&repo, query.action.as_deref())).await
}

async fn send_simulated(state: &AppState, repo: &str, event: GitHubEvent) -> (StatusCode, String) {
    info!(repo = %repo, event = event.event_type(), "Simulating webhook");

    match state.relay().send(&event).await {
        Ok(thread) => {
            info!(repo = %repo, thread = %thread, "Simulated message sent");
            (
                StatusCode::OK,
                format!("Test message sent to Discord thread for repo: {}", repo),
            )
        }
        Err(e) => {
            error!(repo = %repo, error = %e, "Error in webhook simulation");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}
