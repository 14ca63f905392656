//! HTTP server: webhook ingestion, liveness and simulation endpoints.

pub mod health;
pub mod signature;
pub mod simulate;
pub mod webhook;

use std::sync::Arc;

use health::{root_handler, test_handler};
use simulate::{simulate_issue_handler, simulate_webhook_handler};
use webhook::webhook_handler;

use crate::relay::Relay;

/// Shared application state.
///
/// Cheap to clone; every request handler receives its own copy.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    relay: Relay,

    /// Secret for verifying `X-Hub-Signature-256`. Unset disables verification.
    webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(relay: Relay, webhook_secret: Option<String>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                relay,
                webhook_secret,
            }),
        }
    }

    pub fn relay(&self) -> &Relay {
        &self.inner.relay
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(root_handler))
        .route("/test", get(test_handler))
        .route("/github-webhook", post(webhook_handler))
        .route("/simulate-webhook", get(simulate_webhook_handler))
        .route("/simulate-issue", get(simulate_issue_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::common::ThreadId;
    use crate::relay::{DedupCache, EventFormatter};
    use crate::test_utils::{test_router, RecordingClient};

    fn test_app_state(client: Arc<RecordingClient>, secret: Option<&str>) -> AppState {
        let relay = Relay::new(
            test_router(),
            EventFormatter::new("ollim"),
            Arc::new(DedupCache::new(100)),
            client,
        );
        AppState::new(relay, secret.map(str::to_string))
    }

    fn push_body() -> serde_json::Value {
        json!({
            "ref": "refs/heads/main",
            "compare": "https://github.com/ollim/ollim-app/compare/000000...abcdef1",
            "repository": { "name": "ollim-app", "full_name": "ollim/ollim-app" },
            "pusher": { "name": "alice" },
            "sender": { "login": "alice", "avatar_url": "https://avatars.example/alice.png" },
            "commits": [
                {
                    "id": "abcdef1234567890",
                    "message": "fix bug",
                    "author": { "name": "alice" },
                    "timestamp": "2024-05-01T12:00:00Z"
                }
            ]
        })
    }

    fn webhook_request(event: Option<&str>, delivery: Option<&str>, body: &serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/github-webhook")
            .header("content-type", "application/json");
        if let Some(event) = event {
            builder = builder.header("x-github-event", event);
        }
        if let Some(delivery) = delivery {
            builder = builder.header("x-github-delivery", delivery);
        }
        builder
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ─── Liveness ───

    #[tokio::test]
    async fn root_returns_running_banner() {
        let app = build_router(test_app_state(Arc::new(RecordingClient::new()), None));

        let response = app.oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "GitHub to Discord webhook relay server is running!"
        );
    }

    #[tokio::test]
    async fn test_endpoint_returns_200() {
        let app = build_router(test_app_state(Arc::new(RecordingClient::new()), None));

        let response = app.oneshot(get_request("/test")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Test endpoint working!");
    }

    // ─── Webhook ───

    #[tokio::test]
    async fn push_is_delivered_to_repository_thread() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let response = app
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Webhook processed");

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ThreadId::new("222"));
        let embed = &sent[0].1.embeds[0];
        assert_eq!(embed.title, "[ollim-app:main] 1 new commit");
        assert_eq!(embed.fields[0].name, "abcdef1 fix bug");
        assert_eq!(embed.fields[0].value, "alice");
    }

    #[tokio::test]
    async fn unmapped_repository_goes_to_default_thread() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));
        let body = json!({ "repository": { "name": "playground" } });

        let response = app
            .oneshot(webhook_request(Some("star"), None, &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = client.sent();
        assert_eq!(sent[0].0, ThreadId::new("111"));
        assert_eq!(sent[0].1.embeds[0].title, "[playground] star event occurred");
    }

    #[tokio::test]
    async fn missing_event_header_returns_400() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let response = app
            .oneshot(webhook_request(None, Some("d-1"), &push_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing x-github-event header");
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_event_header_returns_400() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));
        let body = json!({ "repository": { "name": "ollim-web" } });

        let response = app
            .oneshot(webhook_request(Some(""), Some("d-1"), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing x-github-event header");
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_repository_returns_400() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));
        let body = json!({ "zen": "Design for failure." });

        let response = app
            .oneshot(webhook_request(Some("ping"), Some("d-1"), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid payload structure");
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        let app = build_router(test_app_state(Arc::new(RecordingClient::new()), None));
        let request = Request::builder()
            .method("POST")
            .uri("/github-webhook")
            .header("x-github-event", "push")
            .body(Body::from("not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_acknowledged_without_sending() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let first = app
            .clone()
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_text(second).await, "Already processed");

        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_returns_500() {
        let client = Arc::new(RecordingClient::failing());
        let app = build_router(test_app_state(client, None));

        let response = app
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error processing webhook");
    }

    #[tokio::test]
    async fn failed_delivery_is_processed_on_redelivery() {
        let client = Arc::new(RecordingClient::failing());
        let app = build_router(test_app_state(client.clone(), None));

        let first = app
            .clone()
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

        client.set_failing(false);
        let second = app
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();
        assert_eq!(body_text(second).await, "Webhook processed");
        assert_eq!(client.sent().len(), 1);
    }

    // ─── Signature ───

    #[tokio::test]
    async fn signed_request_is_accepted() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), Some("s3cret")));
        let body = serde_json::to_vec(&push_body()).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/github-webhook")
            .header("x-github-event", "push")
            .header("x-hub-signature-256", signature::sign("s3cret", &body))
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn unsigned_request_is_rejected_when_secret_is_set() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), Some("s3cret")));

        let response = app
            .oneshot(webhook_request(Some("push"), Some("d-1"), &push_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn wrongly_signed_request_is_rejected() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), Some("s3cret")));
        let body = serde_json::to_vec(&push_body()).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/github-webhook")
            .header("x-github-event", "push")
            .header("x-hub-signature-256", signature::sign("other", &body))
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(client.sent().is_empty());
    }

    // ─── Simulation ───

    #[tokio::test]
    async fn simulate_webhook_sends_push_to_requested_repo() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let response = app
            .oneshot(get_request("/simulate-webhook?repo=ollim-app"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Test message sent to Discord thread for repo: ollim-app"
        );
        let sent = client.sent();
        assert_eq!(sent[0].0, ThreadId::new("222"));
        assert_eq!(sent[0].1.embeds[0].title, "[ollim-app:main] 1 new commit");
    }

    #[tokio::test]
    async fn simulate_webhook_defaults_to_default_repository() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let response = app.oneshot(get_request("/simulate-webhook")).await.unwrap();

        assert_eq!(
            body_text(response).await,
            "Test message sent to Discord thread for repo: ollim-web"
        );
        assert_eq!(client.sent()[0].0, ThreadId::new("111"));
    }

    #[tokio::test]
    async fn simulate_issue_uses_requested_action() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        let response = app
            .oneshot(get_request("/simulate-issue?repo=ollim-app&action=closed"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = client.sent();
        assert!(sent[0].1.embeds[0]
            .title
            .starts_with("[ollim/ollim-app] Issue closed: #"));
    }

    #[tokio::test]
    async fn simulate_is_not_deduplicated() {
        let client = Arc::new(RecordingClient::new());
        let app = build_router(test_app_state(client.clone(), None));

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(get_request("/simulate-issue"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(client.sent().len(), 2);
    }

    #[tokio::test]
    async fn simulate_failure_returns_500_with_detail() {
        let app = build_router(test_app_state(Arc::new(RecordingClient::failing()), None));

        let response = app.oneshot(get_request("/simulate-webhook")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("Error: "));
    }
}
