use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Enumerates supported `IssueState` values.
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `StateReason` values.
pub enum StateReason {
    Completed,
    NotPlanned,
}

impl StateReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotPlanned => "not_planned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `LockReason` values, in keyword lookup order.
pub enum LockReason {
    OffTopic,
    TooHeated,
    Resolved,
    Spam,
}

impl LockReason {
    pub const ALL: [LockReason; 4] = [
        LockReason::OffTopic,
        LockReason::TooHeated,
        LockReason::Resolved,
        LockReason::Spam,
    ];

    /// Keyword used both in operator comments and in the lock API payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OffTopic => "off-topic",
            Self::TooHeated => "too heated",
            Self::Resolved => "resolved",
            Self::Spam => "spam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Read-only view of an issue fetched at decision time.
pub struct IssueSnapshot {
    pub number: u64,
    pub node_id: String,
    pub state: IssueState,
    pub labels: Vec<String>,
    pub title: String,
    pub body: String,
    pub author_login: String,
}

impl IssueSnapshot {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }
}
