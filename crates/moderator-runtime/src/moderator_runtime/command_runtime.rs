//! Comment-command routing: detect, authorize, execute, minimize.

use anyhow::Result;
use moderator_core::issue_command_parser::{
    detect_command, is_rhetorical_question, lock_reason_from_body, match_blurb,
    parse_quoted_title, Blurb, CommandKind, DetectedCommand,
};
use tracing::{info, warn};

use super::event_payload::{CommentAction, CommentRef};
use super::issue_tracker::{add_labels_best_effort, IssueUpdate};
use super::moderator_inputs::{bool_input_or, input_or, json_input, optional_input};
use super::{skip, CheckStatus, ModerationContext, DEFAULT_DUPLICATE_LABEL, DUPLICATE_LABEL_INPUT};

pub const CHECK_NAME: &str = "command";

const ALLOWED_USERS_INPUT: &str = "command-allowed-users";
const BLURBS_INPUT: &str = "blurbs";
const DUPLICATE_ADD_LABEL_INPUT: &str = "duplicate-command-add-label";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one command handler.
pub enum CommandOutcome {
    Executed(String),
    NoOp(String),
}

fn no_op(reason: impl Into<String>) -> Result<CommandOutcome> {
    let reason = reason.into();
    info!("{reason}");
    Ok(CommandOutcome::NoOp(reason))
}

/// Allow-listed logins first, then organization membership. Lookup failures
/// count as "not authorized".
async fn is_authorized(context: &ModerationContext<'_>, login: &str) -> Result<bool> {
    let allowed_users: Vec<String> =
        json_input(context.inputs, ALLOWED_USERS_INPUT)?.unwrap_or_default();
    if allowed_users
        .iter()
        .any(|user| user.trim().eq_ignore_ascii_case(login))
    {
        return Ok(true);
    }
    match context
        .tracker
        .check_org_membership(&context.repo.owner, login)
        .await
    {
        Ok(is_member) => Ok(is_member),
        Err(lookup_error) => {
            warn!("failed to check organization membership for {login}: {lookup_error:#}");
            Ok(false)
        }
    }
}

async fn lock_issue(
    context: &ModerationContext<'_>,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    let reason = lock_reason_from_body(body);
    context.tracker.lock_issue(issue_number, reason).await?;
    let reason = reason.map(|reason| reason.as_str()).unwrap_or("none");
    info!(issue_number, "issue locked (reason: {reason})");
    Ok(CommandOutcome::Executed(format!(
        "locked #{issue_number} (reason: {reason})"
    )))
}

async fn close_duplicate_issue(
    context: &ModerationContext<'_>,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    if is_rhetorical_question(body) {
        return no_op("issue not closed because the comment contains a question");
    }
    let issue = context.tracker.get_issue(issue_number).await?;
    if !issue.is_open() {
        return no_op(format!("issue #{issue_number} is already closed"));
    }
    if bool_input_or(context.inputs, DUPLICATE_ADD_LABEL_INPUT, true) {
        let label = input_or(context.inputs, DUPLICATE_LABEL_INPUT, DEFAULT_DUPLICATE_LABEL);
        add_labels_best_effort(context.tracker, issue_number, &[label]).await;
    }
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::close_not_planned())
        .await?;
    info!(issue_number, "closed issue as duplicate");
    Ok(CommandOutcome::Executed(format!(
        "closed #{issue_number} as duplicate"
    )))
}

async fn delete_issue(
    context: &ModerationContext<'_>,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    if is_rhetorical_question(body) {
        return no_op("issue not deleted because the comment contains a question");
    }
    let issue = context.tracker.get_issue(issue_number).await?;
    context.tracker.delete_issue(&issue.node_id).await?;
    info!(issue_number, "issue deleted");
    Ok(CommandOutcome::Executed(format!("deleted #{issue_number}")))
}

async fn edit_issue_title(
    context: &ModerationContext<'_>,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    let Some(title) = parse_quoted_title(body) else {
        return no_op("title not specified");
    };
    if title.trim().is_empty() {
        return no_op("refusing to set an empty title");
    }
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::retitle(title.as_str()))
        .await?;
    info!(issue_number, "title edited");
    Ok(CommandOutcome::Executed(format!(
        "retitled #{issue_number} to \"{title}\""
    )))
}

async fn post_blurb(
    context: &ModerationContext<'_>,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    let Some(blurbs) = json_input::<Vec<Blurb>>(context.inputs, BLURBS_INPUT)? else {
        return no_op("SKIP: no blurbs set");
    };
    let Some(blurb) = match_blurb(body, &blurbs) else {
        return no_op("no blurb found");
    };
    let issue = context.tracker.get_issue(issue_number).await?;
    if !issue.is_open() {
        return no_op(format!("issue #{issue_number} is already closed"));
    }
    context
        .tracker
        .create_comment(issue_number, &blurb.message)
        .await?;
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::close_not_planned())
        .await?;
    info!(issue_number, "closed issue with blurb");
    Ok(CommandOutcome::Executed(format!(
        "closed #{issue_number} with blurb"
    )))
}

async fn execute_command(
    context: &ModerationContext<'_>,
    kind: CommandKind,
    issue_number: u64,
    body: &str,
) -> Result<CommandOutcome> {
    match kind {
        CommandKind::Blurb => post_blurb(context, issue_number, body).await,
        CommandKind::Duplicate => close_duplicate_issue(context, issue_number, body).await,
        CommandKind::Delete => delete_issue(context, issue_number, body).await,
        CommandKind::EditTitle => edit_issue_title(context, issue_number, body).await,
        CommandKind::Lock => lock_issue(context, issue_number, body).await,
    }
}

/// Run the command, if any, carried by a newly created issue comment.
pub async fn run_command_check(
    context: &ModerationContext<'_>,
    action: &CommentAction,
    issue_number: u64,
    comment: &CommentRef,
) -> Result<CheckStatus> {
    if let CommentAction::Other(other) = action {
        return skip(format!("irrelevant action trigger '{other}'"));
    }
    let Some(DetectedCommand { spec, .. }) = detect_command(&comment.body, |kind| {
        optional_input(context.inputs, &kind.trigger_input_name())
    }) else {
        return skip("no commands found");
    };
    info!("command found: {}", spec.kind.name());

    if !is_authorized(context, &comment.author_login).await? {
        return skip(format!(
            "{} is not an organization member",
            comment.author_login
        ));
    }

    let outcome = execute_command(context, spec.kind, issue_number, &comment.body).await?;
    if spec.minimize_comment {
        if let Err(minimize_error) = context.tracker.minimize_comment(&comment.node_id).await {
            warn!(
                comment_id = comment.id,
                "failed to minimize comment: {minimize_error:#}"
            );
        }
    }

    Ok(match outcome {
        CommandOutcome::Executed(summary) => CheckStatus::Acted(summary),
        CommandOutcome::NoOp(reason) => CheckStatus::Skipped(reason),
    })
}
