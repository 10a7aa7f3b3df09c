//! Per-event moderation orchestration.
//!
//! One webhook delivery is one invocation: the event is routed to the issue
//! checks or to the command router, each check runs in isolation, and any
//! failure is recorded in the [`ModerationReport`] rather than aborting the
//! remaining checks.

use std::future::Future;

use anyhow::{anyhow, bail, Result};
use moderator_core::issue_filter::issue_is_ignored;
use moderator_core::url_extract::UrlExtractor;
use moderator_core::{ConfigError, IssueSnapshot};
use tracing::{error, info, info_span, Instrument};

pub mod auto_close_check;
pub mod catalog_client;
pub mod command_runtime;
pub mod duplicate_url_check;
pub mod event_payload;
pub mod existing_source_check;
pub mod github_api_client;
pub mod issue_tracker;
pub mod moderator_inputs;

use catalog_client::CatalogSource;
use event_payload::ModerationEvent;
use issue_tracker::IssueTrackerClient;
use moderator_inputs::{json_input, optional_input, InputProvider};

pub(crate) const EXCLUDED_DOMAINS_INPUT: &str = "excluded-domains";
pub(crate) const IGNORE_LABEL_INPUT: &str = "auto-close-ignore-label";
pub(crate) const DUPLICATE_LABEL_INPUT: &str = "duplicate-label";
pub(crate) const DEFAULT_DUPLICATE_LABEL: &str = "duplicate";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Repository coordinates in `owner/repo` form.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid repository '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid repository '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Collaborators and configuration handed explicitly to every check.
pub struct ModerationContext<'a> {
    pub tracker: &'a dyn IssueTrackerClient,
    pub catalog: &'a dyn CatalogSource,
    pub inputs: &'a dyn InputProvider,
    pub repo: &'a RepoRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `CheckStatus` values.
pub enum CheckStatus {
    /// The check did not apply (disabled, irrelevant, or nothing to compare).
    Skipped(String),
    /// The check ran and found nothing to act on.
    Passed,
    /// The check mutated the issue.
    Acted(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `CheckReport` used by the orchestrator.
pub struct CheckReport {
    pub name: &'static str,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Public struct `ModerationReport` summarizing one invocation.
pub struct ModerationReport {
    pub checks: Vec<CheckReport>,
}

impl ModerationReport {
    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter_map(|check| match &check.status {
                CheckStatus::Failed(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn status_of(&self, name: &str) -> Option<&CheckStatus> {
        self.checks
            .iter()
            .find(|check| check.name == name)
            .map(|check| &check.status)
    }
}

pub(crate) fn skip(reason: impl Into<String>) -> Result<CheckStatus> {
    let reason = reason.into();
    info!("SKIP: {reason}");
    Ok(CheckStatus::Skipped(reason))
}

/// Skip reason when the fresh snapshot carries the configured ignore label.
pub(crate) fn ignore_reason(inputs: &dyn InputProvider, issue: &IssueSnapshot) -> Option<String> {
    let ignore_label = optional_input(inputs, IGNORE_LABEL_INPUT)?;
    issue_is_ignored(issue.labels.iter().map(String::as_str), Some(&ignore_label))
        .then(|| format!("ignoring issue with label {ignore_label}"))
}

/// URL extractor with any configured extra domain exclusions.
pub(crate) fn configured_url_extractor(
    inputs: &dyn InputProvider,
) -> Result<UrlExtractor, ConfigError> {
    let extra: Vec<String> = json_input(inputs, EXCLUDED_DOMAINS_INPUT)?.unwrap_or_default();
    Ok(UrlExtractor::default().with_excluded_domains(extra.iter().map(String::as_str)))
}

async fn run_check<F>(name: &'static str, check: F) -> CheckReport
where
    F: Future<Output = Result<CheckStatus>>,
{
    let status = match check.instrument(info_span!("check", name)).await {
        Ok(status) => status,
        Err(failure) => {
            error!(check = name, "{failure:#}");
            CheckStatus::Failed(format!("{name}: {failure:#}"))
        }
    };
    CheckReport { name, status }
}

/// Run every check relevant to `event` and report their outcomes.
pub async fn run_moderation(
    context: &ModerationContext<'_>,
    event: &ModerationEvent,
) -> ModerationReport {
    let mut report = ModerationReport::default();
    match event {
        ModerationEvent::Issue {
            action,
            issue_number,
        } => {
            info!(
                repo = %context.repo.as_slug(),
                issue_number,
                action = action.as_str(),
                "moderating issue event"
            );
            report.checks.push(
                run_check(
                    auto_close_check::CHECK_NAME,
                    auto_close_check::run_auto_close_check(context, action, *issue_number),
                )
                .await,
            );
            report.checks.push(
                run_check(
                    existing_source_check::CHECK_NAME,
                    existing_source_check::run_existing_source_check(
                        context,
                        action,
                        *issue_number,
                    ),
                )
                .await,
            );
            report.checks.push(
                run_check(
                    duplicate_url_check::CHECK_NAME,
                    duplicate_url_check::run_duplicate_url_check(context, action, *issue_number),
                )
                .await,
            );
        }
        ModerationEvent::Comment {
            action,
            issue_number,
            comment,
        } => {
            info!(
                repo = %context.repo.as_slug(),
                issue_number,
                comment_id = comment.id,
                "moderating comment event"
            );
            report.checks.push(
                run_check(
                    command_runtime::CHECK_NAME,
                    command_runtime::run_command_check(context, action, *issue_number, comment),
                )
                .await,
            );
        }
    }
    report
}
