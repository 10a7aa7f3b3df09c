use anyhow::Result;
use futures_util::future::join_all;
use moderator_core::duplicate_detect::{find_duplicates, merge_candidate_groups};
use moderator_core::issue_filter::{build_issue_label_set, issue_has_any_label};
use moderator_core::message_template::{join_issue_references, render_template};
use tracing::info;

use super::event_payload::IssueAction;
use super::issue_tracker::{add_labels_best_effort, IssueUpdate};
use super::moderator_inputs::{bool_input, bool_input_or, input_or, required_json_input};
use super::{
    configured_url_extractor, ignore_reason, skip, CheckStatus, ModerationContext,
    DEFAULT_DUPLICATE_LABEL, DUPLICATE_LABEL_INPUT,
};

pub const CHECK_NAME: &str = "duplicate-url";

const ENABLED_INPUT: &str = "duplicate-check-enabled";
const LABELS_INPUT: &str = "duplicate-check-labels";
const COMMENT_INPUT: &str = "duplicate-check-comment";
const ADD_LABEL_INPUT: &str = "duplicate-check-add-label";
const DEFAULT_COMMENT: &str = "This issue shares a URL with {duplicateIssuesText}.";

/// Close a newly opened issue whose URLs already appear in another open issue.
pub async fn run_duplicate_url_check(
    context: &ModerationContext<'_>,
    action: &IssueAction,
    issue_number: u64,
) -> Result<CheckStatus> {
    if *action != IssueAction::Opened {
        return skip(format!("irrelevant action trigger '{}'", action.as_str()));
    }
    if !bool_input(context.inputs, ENABLED_INPUT) {
        return skip("the duplicate URL check is disabled");
    }
    let labels_to_check: Vec<String> = required_json_input(context.inputs, LABELS_INPUT)?;
    let extractor = configured_url_extractor(context.inputs)?;

    let issue = context.tracker.get_issue(issue_number).await?;
    if let Some(reason) = ignore_reason(context.inputs, &issue) {
        return skip(reason);
    }
    let wanted = build_issue_label_set(labels_to_check.iter().map(String::as_str));
    if !issue_has_any_label(issue.labels.iter().map(String::as_str), &wanted) {
        return skip("no duplicate check label set");
    }
    if !issue.is_open() {
        return skip(format!("issue #{issue_number} is no longer open"));
    }

    let issue_urls = extractor.extract(&issue.body);
    if issue_urls.is_empty() {
        return skip("no URLs found in the issue body");
    }

    let groups = join_all(
        labels_to_check
            .iter()
            .map(|label| context.tracker.list_open_issues(label)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>>>()?;
    let candidates = merge_candidate_groups(groups);
    let duplicates = find_duplicates(&issue_urls, issue.number, &candidates, &extractor);
    if duplicates.is_empty() {
        info!("no duplicate issues were found");
        return Ok(CheckStatus::Passed);
    }
    let duplicate_issues_text = join_issue_references(&duplicates);
    info!(issue_number, "duplicate of {duplicate_issues_text}");

    if bool_input_or(context.inputs, ADD_LABEL_INPUT, true) {
        let label = input_or(context.inputs, DUPLICATE_LABEL_INPUT, DEFAULT_DUPLICATE_LABEL);
        add_labels_best_effort(context.tracker, issue_number, &[label]).await;
    }
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::close_not_planned())
        .await?;
    let template = input_or(context.inputs, COMMENT_INPUT, DEFAULT_COMMENT);
    let comment = render_template(
        &template,
        &[("duplicateIssuesText", duplicate_issues_text.as_str())],
    );
    context.tracker.create_comment(issue_number, &comment).await?;

    Ok(CheckStatus::Acted(format!(
        "closed #{issue_number} as duplicate of {duplicate_issues_text}"
    )))
}
