use anyhow::{bail, Context, Result};
use moderator_core::{IssueSnapshot, IssueState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubUser` used across moderator components.
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubIssueLabel` used across moderator components.
pub struct GithubIssueLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue object shared by the REST API and webhook payloads.
pub struct GithubIssue {
    pub number: u64,
    #[serde(default)]
    pub node_id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: IssueState,
    pub user: GithubUser,
    #[serde(default)]
    pub labels: Vec<GithubIssueLabel>,
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl GithubIssue {
    pub fn into_snapshot(self) -> IssueSnapshot {
        IssueSnapshot {
            number: self.number,
            node_id: self.node_id,
            state: self.state,
            labels: self.labels.into_iter().map(|label| label.name).collect(),
            title: self.title,
            body: self.body.unwrap_or_default(),
            author_login: self.user.login,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubIssueComment` embedded in comment events.
pub struct GithubIssueComment {
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `IssueAction` values.
pub enum IssueAction {
    Opened,
    Edited,
    Reopened,
    Other(String),
}

impl IssueAction {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "opened" => Self::Opened,
            "edited" => Self::Edited,
            "reopened" => Self::Reopened,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Reopened => "reopened",
            Self::Other(other) => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `CommentAction` values.
pub enum CommentAction {
    Created,
    Other(String),
}

impl CommentAction {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "created" => Self::Created,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The identity-bearing parts of a triggering comment.
pub struct CommentRef {
    pub id: u64,
    pub node_id: String,
    pub body: String,
    pub author_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A webhook delivery reduced to what the moderator trusts. Mutable issue
/// fields are deliberately absent; checks re-fetch them.
pub enum ModerationEvent {
    Issue {
        action: IssueAction,
        issue_number: u64,
    },
    Comment {
        action: CommentAction,
        issue_number: u64,
        comment: CommentRef,
    },
}

#[derive(Debug, Deserialize)]
struct EventIssueRef {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    issue: Option<EventIssueRef>,
    #[serde(default)]
    comment: Option<GithubIssueComment>,
    #[serde(default)]
    sender: Option<GithubUser>,
}

/// Parse a webhook payload. Returns `Ok(None)` for irrelevant deliveries.
pub fn parse_moderation_event(event_name: &str, payload: &str) -> Result<Option<ModerationEvent>> {
    let envelope: EventEnvelope =
        serde_json::from_str(payload).context("failed to decode webhook event payload")?;
    if envelope.sender.is_none() {
        bail!("internal error, no sender provided by GitHub");
    }

    match event_name {
        "issues" => {
            let (Some(action), Some(issue)) = (envelope.action, envelope.issue) else {
                return Ok(None);
            };
            Ok(Some(ModerationEvent::Issue {
                action: IssueAction::parse(&action),
                issue_number: issue.number,
            }))
        }
        "issue_comment" => {
            let (Some(action), Some(issue), Some(comment)) =
                (envelope.action, envelope.issue, envelope.comment)
            else {
                return Ok(None);
            };
            Ok(Some(ModerationEvent::Comment {
                action: CommentAction::parse(&action),
                issue_number: issue.number,
                comment: CommentRef {
                    id: comment.id,
                    node_id: comment.node_id,
                    body: comment.body.unwrap_or_default(),
                    author_login: comment.user.login,
                },
            }))
        }
        _ => Ok(None),
    }
}
