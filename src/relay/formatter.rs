//! GitHub event formatting for Discord.
//!
//! Turns a typed [`GitHubEvent`] into a webhook [`Message`] carrying a single
//! embed. Formatting only reads the event; the output depends on nothing else
//! apart from the organization used to complete bare repository names.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::common::{Embed, EmbedAuthor, EmbedField, EmbedFooter, Message};
use crate::relay::events::{
    GitHubEvent, Issue, IssuesEvent, OtherEvent, PullRequestEvent, PushEvent, User,
};

/// Default embed color.
pub const COLOR_BLUE: u32 = 3447003;
/// Opened pull requests and issues.
pub const COLOR_GREEN: u32 = 5025616;
/// Merged pull requests.
pub const COLOR_PURPLE: u32 = 10181046;
/// Closed pull requests and issues.
pub const COLOR_RED: u32 = 15158332;
/// Reopened issues.
pub const COLOR_ORANGE: u32 = 15105570;

/// Commits listed individually in a push embed.
pub const MAX_LISTED_COMMITS: usize = 5;
/// Limit for the first line of a commit message.
pub const COMMIT_MESSAGE_LIMIT: usize = 60;
/// Limit for PR and issue titles inside link fields.
pub const LINK_TITLE_LIMIT: usize = 100;
/// Limit for PR and issue bodies.
pub const BODY_LIMIT: usize = 1000;
/// Discord rejects embed titles longer than this.
pub const EMBED_TITLE_LIMIT: usize = 256;

const ELLIPSIS: &str = "...";
const SHORT_HASH_LEN: usize = 7;

/// Shown instead of an empty issue body.
pub const EMPTY_ISSUE_BODY: &str = "No description provided.";

/// Identity used when an event names no actor.
pub const FALLBACK_NAME: &str = "GitHub";
pub const FALLBACK_AVATAR: &str =
    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

/// Formats GitHub events into Discord webhook messages.
#[derive(Debug, Clone)]
pub struct EventFormatter {
    /// Organization prepended to repository names that arrive without one.
    default_org: String,
}

/// Who a message is presented as.
#[derive(Debug, Clone, PartialEq)]
struct Identity {
    name: String,
    avatar_url: String,
    profile_url: Option<String>,
}

impl Identity {
    fn from_user(user: &User) -> Self {
        Self {
            name: user.login.clone(),
            avatar_url: avatar_or_default(&user.login, user.avatar_url.as_deref()),
            profile_url: user.html_url.clone(),
        }
    }

    fn fallback() -> Self {
        Self {
            name: FALLBACK_NAME.to_string(),
            avatar_url: FALLBACK_AVATAR.to_string(),
            profile_url: None,
        }
    }

    fn author(&self) -> EmbedAuthor {
        EmbedAuthor {
            name: self.name.clone(),
            icon_url: Some(self.avatar_url.clone()),
            url: self.profile_url.clone(),
        }
    }

    fn into_message(self, mut embed: Embed) -> Message {
        embed.author = Some(self.author());
        Message {
            username: self.name,
            avatar_url: self.avatar_url,
            embeds: vec![embed],
        }
    }
}

impl EventFormatter {
    pub fn new(default_org: impl Into<String>) -> Self {
        Self {
            default_org: default_org.into(),
        }
    }

    /// Format an event into the message posted to Discord.
    pub fn format(&self, event: &GitHubEvent) -> Message {
        match event {
            GitHubEvent::Push(push) => self.format_push(push),
            GitHubEvent::PullRequest(pr) => self.format_pull_request(pr),
            GitHubEvent::Issues(issue) => self.format_issue(issue),
            GitHubEvent::Other(other) => self.format_other(other),
        }
    }

    fn format_push(&self, push: &PushEvent) -> Message {
        let count = push.commits.len();
        let title = format!(
            "[{}:{}] {} new commit{}",
            push.repository.name,
            push.branch(),
            count,
            if count == 1 { "" } else { "s" }
        );

        let mut fields: Vec<EmbedField> = push
            .commits
            .iter()
            .take(MAX_LISTED_COMMITS)
            .map(|commit| {
                EmbedField::new(
                    format!(
                        "{} {}",
                        short_hash(&commit.id),
                        truncate(first_line(&commit.message), COMMIT_MESSAGE_LIMIT)
                    ),
                    non_empty(&commit.author.name, "unknown"),
                )
            })
            .collect();

        if count > MAX_LISTED_COMMITS {
            let value = match &push.compare {
                Some(compare) => format!("[View comparison]({})", compare),
                None => "See the full push on GitHub".to_string(),
            };
            fields.push(EmbedField::new(
                format!("+{} more", count - MAX_LISTED_COMMITS),
                value,
            ));
        }

        // The pusher is a git identity; only the sender carries an avatar.
        let name = push
            .pusher
            .as_ref()
            .map(|pusher| pusher.name.clone())
            .or_else(|| push.sender.as_ref().map(|sender| sender.login.clone()))
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        let sender_avatar = push.sender.as_ref().and_then(|s| s.avatar_url.as_deref());
        let identity = Identity {
            avatar_url: avatar_or_default(&name, sender_avatar),
            profile_url: None,
            name,
        };

        let timestamp = push
            .head_commit
            .as_ref()
            .or_else(|| push.commits.last())
            .and_then(|commit| commit.timestamp.as_ref())
            .map(embed_timestamp);

        identity.into_message(Embed {
            title: truncate(&title, EMBED_TITLE_LIMIT),
            url: push.compare.clone(),
            color: COLOR_BLUE,
            fields,
            timestamp,
            ..Default::default()
        })
    }

    fn format_pull_request(&self, event: &PullRequestEvent) -> Message {
        let pr = &event.pull_request;
        let merged = pr.is_merged();

        let (color, state) = match event.action.as_str() {
            "opened" => (COLOR_GREEN, "opened"),
            "closed" if merged => (COLOR_PURPLE, "merged"),
            "closed" => (COLOR_RED, "closed"),
            other => (COLOR_BLUE, other),
        };

        let title = format!(
            "[{}] PR {}: #{} {}",
            event.repository.name, event.action, pr.number, pr.title
        );

        let embed = Embed {
            title: truncate(&title, EMBED_TITLE_LIMIT),
            url: Some(pr.html_url.clone()),
            description: pr
                .body
                .as_deref()
                .filter(|body| !body.trim().is_empty())
                .map(|body| truncate(body, BODY_LIMIT)),
            color,
            fields: vec![EmbedField::new(
                "Pull Request",
                format!("[{}]({})", truncate(&pr.title, LINK_TITLE_LIMIT), pr.html_url),
            )],
            timestamp: pr.updated_at.as_ref().map(embed_timestamp),
            footer: Some(EmbedFooter {
                text: state.to_string(),
            }),
            ..Default::default()
        };

        Identity::from_user(&pr.user).into_message(embed)
    }

    fn format_issue(&self, event: &IssuesEvent) -> Message {
        let issue = &event.issue;

        let color = match event.action.as_str() {
            "opened" => COLOR_GREEN,
            "closed" => COLOR_RED,
            "reopened" => COLOR_ORANGE,
            _ => COLOR_BLUE,
        };

        let title = format!(
            "[{}] Issue {}: #{} {}",
            self.repository_full_name(event),
            event.action,
            issue.number,
            issue.title
        );

        let description = match issue.body.as_deref() {
            Some(body) if !body.trim().is_empty() => truncate(body, BODY_LIMIT),
            _ => EMPTY_ISSUE_BODY.to_string(),
        };

        let embed = Embed {
            title: truncate(&title, EMBED_TITLE_LIMIT),
            url: Some(issue.html_url.clone()),
            description: Some(description),
            color,
            fields: issue_fields(issue),
            timestamp: issue.updated_at.as_ref().map(embed_timestamp),
            ..Default::default()
        };

        Identity::from_user(&issue.user).into_message(embed)
    }

    fn format_other(&self, event: &OtherEvent) -> Message {
        let embed = Embed {
            title: truncate(
                &format!("[{}] {} event occurred", event.repository.name, event.event_type),
                EMBED_TITLE_LIMIT,
            ),
            description: Some(format!("A {} event occurred on GitHub.", event.event_type)),
            color: COLOR_BLUE,
            ..Default::default()
        };

        event
            .sender
            .as_ref()
            .map(Identity::from_user)
            .unwrap_or_else(Identity::fallback)
            .into_message(embed)
    }

    /// `org/repo` for an issue event.
    ///
    /// Prefers the payload's full name, then the organization block, then the
    /// configured default organization.
    fn repository_full_name(&self, event: &IssuesEvent) -> String {
        if let Some(full_name) = event
            .repository
            .full_name
            .as_deref()
            .filter(|name| !name.is_empty())
        {
            return full_name.to_string();
        }

        let org = event
            .organization
            .as_ref()
            .map(|org| org.login.as_str())
            .unwrap_or(self.default_org.as_str());
        format!("{}/{}", org, event.repository.name)
    }
}

fn issue_fields(issue: &Issue) -> Vec<EmbedField> {
    let mut fields = vec![EmbedField::new(
        "Issue",
        format!(
            "[#{} {}]({})",
            issue.number,
            truncate(&issue.title, LINK_TITLE_LIMIT),
            issue.html_url
        ),
    )];

    if !issue.labels.is_empty() {
        let labels: Vec<String> = issue
            .labels
            .iter()
            .map(|label| format!("`{}`", label.name))
            .collect();
        fields.push(EmbedField::inline("Labels", labels.join(", ")));
    }

    if !issue.assignees.is_empty() {
        let assignees: Vec<String> = issue
            .assignees
            .iter()
            .map(|user| format!("@{}", user.login))
            .collect();
        fields.push(EmbedField::inline("Assignees", assignees.join(", ")));
    }

    if let Some(milestone) = &issue.milestone {
        fields.push(EmbedField::inline("Milestone", milestone.title.clone()));
    }

    fields
}

/// Shorten `text` to at most `limit` characters, marking the cut with `...`.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let kept: String = text.chars().take(limit.saturating_sub(ELLIPSIS.len())).collect();
    format!("{}{}", kept, ELLIPSIS)
}

/// First line of a (possibly multi-line) commit message.
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Abbreviated commit hash.
pub fn short_hash(id: &str) -> &str {
    match id.char_indices().nth(SHORT_HASH_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// The given avatar, or the one GitHub serves for `login`.
pub fn avatar_or_default(login: &str, avatar_url: Option<&str>) -> String {
    match avatar_url.filter(|url| !url.is_empty()) {
        Some(url) => url.to_string(),
        None => format!("https://github.com/{}.png", login),
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn embed_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
