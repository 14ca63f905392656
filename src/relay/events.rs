//! Typed GitHub webhook events.
//!
//! The `X-GitHub-Event` header is resolved once into a [`GitHubEvent`] variant
//! and the body is decoded into that variant's payload. Only the fields the
//! formatter reads are modelled; everything else in the payload is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::common::error::EventError;

/// A GitHub event the relay knows how to present.
#[derive(Debug, Clone, PartialEq)]
pub enum GitHubEvent {
    Push(PushEvent),
    PullRequest(PullRequestEvent),
    Issues(IssuesEvent),
    /// Any other event type, presented generically.
    Other(OtherEvent),
}

impl GitHubEvent {
    /// Decode a webhook body according to its `X-GitHub-Event` header value.
    pub fn from_payload(event_type: &str, payload: &Value) -> Result<Self, EventError> {
        if payload.get("repository").map_or(true, Value::is_null) {
            return Err(EventError::MissingRepository);
        }

        let invalid = |source| EventError::InvalidPayload {
            event: event_type.to_string(),
            source,
        };

        let event = match event_type {
            "push" => Self::Push(PushEvent::deserialize(payload).map_err(invalid)?),
            "pull_request" => {
                Self::PullRequest(PullRequestEvent::deserialize(payload).map_err(invalid)?)
            }
            "issues" => Self::Issues(IssuesEvent::deserialize(payload).map_err(invalid)?),
            _ => {
                let mut other = OtherEvent::deserialize(payload).map_err(invalid)?;
                other.event_type = event_type.to_string();
                Self::Other(other)
            }
        };

        Ok(event)
    }

    /// The event name as GitHub sends it in `X-GitHub-Event`.
    pub fn event_type(&self) -> &str {
        match self {
            Self::Push(_) => "push",
            Self::PullRequest(_) => "pull_request",
            Self::Issues(_) => "issues",
            Self::Other(other) => &other.event_type,
        }
    }

    /// The repository the event originated from.
    pub fn repository(&self) -> &Repository {
        match self {
            Self::Push(push) => &push.repository,
            Self::PullRequest(pr) => &pr.repository,
            Self::Issues(issue) => &issue.repository,
            Self::Other(other) => &other.repository,
        }
    }

    pub fn repository_name(&self) -> &str {
        &self.repository().name
    }
}

/// Repository block common to all events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Organization block, present for repositories owned by an organization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Organization {
    pub login: String,
}

/// A GitHub account (sender, PR author, issue creator, assignee).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// `push` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub compare: Option<String>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub head_commit: Option<Commit>,
    #[serde(default)]
    pub pusher: Option<Pusher>,
    pub repository: Repository,
    #[serde(default)]
    pub sender: Option<User>,
}

impl PushEvent {
    /// Branch name with the `refs/heads/` prefix removed.
    pub fn branch(&self) -> &str {
        self.git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.git_ref)
    }
}

/// Who pushed. Git identity, not necessarily a GitHub login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pusher {
    pub name: String,
}

/// A commit listed in a push.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub message: String,
    pub author: CommitAuthor,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}

/// `pull_request` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequest,
    pub repository: Repository,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub merged: Option<bool>,
    pub user: User,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }
}

/// `issues` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssuesEvent {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub sender: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Milestone {
    pub title: String,
}

/// Any event type without a dedicated layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OtherEvent {
    /// Filled from the `X-GitHub-Event` header, not the body.
    #[serde(skip)]
    pub event_type: String,
    pub repository: Repository,
    #[serde(default)]
    pub sender: Option<User>,
}
