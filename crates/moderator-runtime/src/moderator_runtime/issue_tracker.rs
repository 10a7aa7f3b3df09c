use anyhow::Result;
use async_trait::async_trait;
use moderator_core::{IssueSnapshot, IssueState, LockReason, StateReason};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Fields of an issue update; `None` fields are left untouched.
pub struct IssueUpdate {
    pub state: Option<IssueState>,
    pub state_reason: Option<StateReason>,
    pub title: Option<String>,
}

impl IssueUpdate {
    pub fn close_not_planned() -> Self {
        Self {
            state: Some(IssueState::Closed),
            state_reason: Some(StateReason::NotPlanned),
            title: None,
        }
    }

    pub fn retitle(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
/// Trait contract for the issue-tracker collaborator.
///
/// Every call is a single attempt; transport and API failures surface as
/// errors, business outcomes (not a member) as values.
pub trait IssueTrackerClient: Send + Sync {
    async fn get_issue(&self, issue_number: u64) -> Result<IssueSnapshot>;

    async fn list_open_issues(&self, label: &str) -> Result<Vec<IssueSnapshot>>;

    async fn update_issue(&self, issue_number: u64, update: &IssueUpdate) -> Result<()>;

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<()>;

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<()>;

    async fn lock_issue(&self, issue_number: u64, reason: Option<LockReason>) -> Result<()>;

    async fn delete_issue(&self, issue_node_id: &str) -> Result<()>;

    async fn minimize_comment(&self, comment_node_id: &str) -> Result<()>;

    async fn check_org_membership(&self, org: &str, username: &str) -> Result<bool>;
}

/// Add labels as a side action: failures are logged and swallowed.
pub(crate) async fn add_labels_best_effort(
    tracker: &dyn IssueTrackerClient,
    issue_number: u64,
    labels: &[String],
) {
    if labels.is_empty() {
        return;
    }
    if let Err(error) = tracker.add_labels(issue_number, labels).await {
        warn!(issue_number, "failed to add labels {labels:?}: {error:#}");
    }
}
