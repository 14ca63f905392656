//! Synthetic events for manual verification.
//!
//! Used by the `/simulate-*` endpoints to push a realistic message through
//! the same routing, formatting and delivery path as real webhooks.

use crate::relay::events::{
    Commit, CommitAuthor, GitHubEvent, Issue, IssuesEvent, Label, PushEvent, Pusher, Repository,
    User,
};

/// Name the synthetic events are attributed to.
pub const SIMULATION_USER: &str = "relay-bot";

/// Issue action used when none is requested.
pub const DEFAULT_SIMULATED_ACTION: &str = "opened";

fn repository(repo: &str) -> Repository {
    Repository {
        name: repo.to_string(),
        full_name: None,
    }
}

fn simulation_user() -> User {
    User {
        login: SIMULATION_USER.to_string(),
        avatar_url: None,
        html_url: None,
    }
}

/// A push of one commit to `main` of `repo`.
pub fn simulated_push(repo: &str) -> GitHubEvent {
    let commit = Commit {
        id: "0000000000000000000000000000000000000000".to_string(),
        message: format!("Test commit for {}\n\nSent by the relay simulation endpoint.", repo),
        author: CommitAuthor {
            name: SIMULATION_USER.to_string(),
        },
        timestamp: None,
    };

    GitHubEvent::Push(PushEvent {
        git_ref: "refs/heads/main".to_string(),
        compare: Some(format!("https://github.com/{}/compare", repo)),
        commits: vec![commit],
        head_commit: None,
        pusher: Some(Pusher {
            name: SIMULATION_USER.to_string(),
        }),
        repository: repository(repo),
        sender: Some(simulation_user()),
    })
}

/// Issue #1 of `repo` with the given action (defaults to `opened`).
pub fn simulated_issue(repo: &str, action: Option<&str>) -> GitHubEvent {
    let action = action
        .filter(|action| !action.is_empty())
        .unwrap_or(DEFAULT_SIMULATED_ACTION);

    GitHubEvent::Issues(IssuesEvent {
        action: action.to_string(),
        issue: Issue {
            number: 1,
            title: "Test issue".to_string(),
            body: Some(format!("This is a test issue for the {} repository.", repo)),
            html_url: format!("https://github.com/{}/issues/1", repo),
            user: simulation_user(),
            labels: vec![Label {
                name: "test".to_string(),
            }],
            assignees: Vec::new(),
            milestone: None,
            updated_at: None,
        },
        repository: repository(repo),
        organization: None,
        sender: Some(simulation_user()),
    })
}
