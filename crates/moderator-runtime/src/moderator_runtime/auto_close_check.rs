use anyhow::Result;
use moderator_core::issue_rules::{evaluate_rules, validate_rules, Rule};
use moderator_core::message_template::render_template;
use moderator_core::IssueState;
use tracing::info;

use super::event_payload::IssueAction;
use super::issue_tracker::{add_labels_best_effort, IssueUpdate};
use super::moderator_inputs::{input_or, json_input};
use super::{ignore_reason, skip, CheckStatus, ModerationContext};

pub const CHECK_NAME: &str = "auto-close";

const RULES_INPUT: &str = "auto-close-rules";
const COMMENT_INPUT: &str = "auto-close-comment";
const DEFAULT_COMMENT_HEADER: &str = "@{author} this issue was {closureAction} because:";

fn closure_action(action: &IssueAction) -> &'static str {
    match action {
        IssueAction::Opened => "automatically closed",
        _ => "not reopened",
    }
}

/// Closure comments are only posted when they describe a state change the
/// author will notice.
fn should_comment(action: &IssueAction, state: IssueState) -> bool {
    matches!(
        (action, state),
        (IssueAction::Opened, IssueState::Open)
            | (IssueAction::Edited, IssueState::Closed)
            | (IssueAction::Reopened, IssueState::Open)
    )
}

pub(crate) fn render_closure_comment(
    header_template: &str,
    author: &str,
    action: &IssueAction,
    failed_messages: &[String],
) -> String {
    let header = render_template(
        header_template,
        &[("author", author), ("closureAction", closure_action(action))],
    );
    let mut body = header;
    body.push('\n');
    for message in failed_messages {
        body.push_str("\n- ");
        body.push_str(message);
    }
    body
}

/// Evaluate the configured rules against the freshly fetched issue and close it on failure.
pub async fn run_auto_close_check(
    context: &ModerationContext<'_>,
    action: &IssueAction,
    issue_number: u64,
) -> Result<CheckStatus> {
    if !matches!(
        action,
        IssueAction::Opened | IssueAction::Edited | IssueAction::Reopened
    ) {
        return skip(format!("irrelevant action trigger '{}'", action.as_str()));
    }
    let Some(rules) = json_input::<Vec<Rule>>(context.inputs, RULES_INPUT)? else {
        return skip("no auto-close rules set");
    };
    validate_rules(&rules)?;

    let issue = context.tracker.get_issue(issue_number).await?;
    if let Some(reason) = ignore_reason(context.inputs, &issue) {
        return skip(reason);
    }

    let outcome = evaluate_rules(&rules, &issue.title, &issue.body)?;
    for verdict in &outcome.verdicts {
        if verdict.failed {
            info!("Failed: {}", verdict.message);
        } else {
            info!("Passed: {}", verdict.message);
        }
    }
    if !outcome.has_failures() {
        return Ok(CheckStatus::Passed);
    }

    if should_comment(action, issue.state) {
        let header_template = input_or(context.inputs, COMMENT_INPUT, DEFAULT_COMMENT_HEADER);
        let comment = render_closure_comment(
            &header_template,
            &issue.author_login,
            action,
            &outcome.failed_messages,
        );
        context.tracker.create_comment(issue_number, &comment).await?;
    }
    add_labels_best_effort(context.tracker, issue_number, &outcome.labels_to_apply).await;

    if !issue.is_open() {
        info!(issue_number, "issue already closed");
        return Ok(CheckStatus::Acted(format!(
            "{} rule(s) failed on closed issue #{issue_number}",
            outcome.failed_messages.len()
        )));
    }
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::close_not_planned())
        .await?;
    info!(issue_number, "issue closed");
    Ok(CheckStatus::Acted(format!(
        "closed #{issue_number}: {} rule(s) failed",
        outcome.failed_messages.len()
    )))
}
