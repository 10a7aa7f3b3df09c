use anyhow::Result;
use moderator_core::catalog_match::{find_existing, language_display_name, CatalogEntry};
use moderator_core::issue_filter::{build_issue_label_set, issue_has_any_label};
use moderator_core::message_template::render_template;
use tracing::{error, info};

use super::event_payload::IssueAction;
use super::issue_tracker::{add_labels_best_effort, IssueUpdate};
use super::moderator_inputs::{
    bool_input, bool_input_or, input_or, optional_input, required_input, required_json_input,
};
use super::{
    configured_url_extractor, ignore_reason, skip, CheckStatus, ModerationContext,
    DEFAULT_DUPLICATE_LABEL, DUPLICATE_LABEL_INPUT,
};

pub const CHECK_NAME: &str = "existing-source";

const ENABLED_INPUT: &str = "existing-check-enabled";
const LABELS_INPUT: &str = "existing-check-labels";
const REPO_URL_INPUT: &str = "existing-check-repo-url";
const COMMENT_INPUT: &str = "existing-check-comment";
const ADD_LABEL_INPUT: &str = "existing-check-add-label";
const NAME_PREFIX_INPUT: &str = "existing-check-name-prefix";
const DEFAULT_COMMENT: &str =
    "{requestUrl} is already available as {extensionName} ({extensionLang}).";

pub(crate) fn render_existing_comment(
    template: &str,
    request_url: &str,
    entry: &CatalogEntry,
    name_prefix: Option<&str>,
) -> String {
    let extension_name = entry.display_name(name_prefix);
    let extension_lang = language_display_name(&entry.language_code);
    render_template(
        template,
        &[
            ("requestUrl", request_url),
            ("extensionName", extension_name.as_str()),
            ("extensionLang", extension_lang.as_str()),
        ],
    )
}

/// Close a newly opened request whose primary URL is already in the catalog.
pub async fn run_existing_source_check(
    context: &ModerationContext<'_>,
    action: &IssueAction,
    issue_number: u64,
) -> Result<CheckStatus> {
    if *action != IssueAction::Opened {
        return skip(format!("irrelevant action trigger '{}'", action.as_str()));
    }
    if !bool_input(context.inputs, ENABLED_INPUT) {
        return skip("the existing source check is disabled");
    }
    let labels_to_check: Vec<String> = required_json_input(context.inputs, LABELS_INPUT)?;
    let catalog_url = required_input(context.inputs, REPO_URL_INPUT)?;
    let extractor = configured_url_extractor(context.inputs)?;

    let issue = context.tracker.get_issue(issue_number).await?;
    if let Some(reason) = ignore_reason(context.inputs, &issue) {
        return skip(reason);
    }
    let wanted = build_issue_label_set(labels_to_check.iter().map(String::as_str));
    if !issue_has_any_label(issue.labels.iter().map(String::as_str), &wanted) {
        return skip("no existing check label set");
    }
    if !issue.is_open() {
        return skip(format!("issue #{issue_number} is no longer open"));
    }

    let Some(request_url) = extractor.extract(&issue.body).into_iter().next() else {
        return skip("no URLs found in the issue body");
    };

    info!("fetching {catalog_url}");
    let catalog = match context.catalog.fetch_catalog(&catalog_url).await {
        Ok(catalog) => catalog,
        Err(fetch_error) => {
            error!("failed to fetch the catalog, aborting: {fetch_error:#}");
            return skip("catalog unavailable");
        }
    };
    let Some(entry) = find_existing(&request_url, &catalog) else {
        info!("existing entry with the URL \"{request_url}\" was not found");
        return Ok(CheckStatus::Passed);
    };

    if bool_input_or(context.inputs, ADD_LABEL_INPUT, true) {
        let label = input_or(context.inputs, DUPLICATE_LABEL_INPUT, DEFAULT_DUPLICATE_LABEL);
        add_labels_best_effort(context.tracker, issue_number, &[label]).await;
    }
    context
        .tracker
        .update_issue(issue_number, &IssueUpdate::close_not_planned())
        .await?;
    let template = input_or(context.inputs, COMMENT_INPUT, DEFAULT_COMMENT);
    let name_prefix = optional_input(context.inputs, NAME_PREFIX_INPUT);
    let comment = render_existing_comment(&template, &request_url, entry, name_prefix.as_deref());
    context.tracker.create_comment(issue_number, &comment).await?;

    Ok(CheckStatus::Acted(format!(
        "closed #{issue_number}: {request_url} already exists as {}",
        entry.name
    )))
}

#[cfg(test)]
mod tests {
    use super::{render_existing_comment, NAME_PREFIX_INPUT};
    use crate::moderator_runtime::moderator_inputs::{optional_input, StaticInputProvider};
    use moderator_core::catalog_match::{CatalogEntry, CatalogSource};

    fn entry() -> CatalogEntry {
        CatalogEntry {
            name: "Tachiyomi: MangaDex".to_string(),
            language_code: "all".to_string(),
            sources: vec![CatalogSource {
                base_url: "https://mangadex.org".to_string(),
            }],
        }
    }

    #[test]
    fn unit_existing_comment_substitutes_catalog_values() {
        let comment = render_existing_comment(
            "{requestUrl} exists as {extensionName} [{extensionLang}]",
            "mangadex.org",
            &entry(),
            Some("Tachiyomi: "),
        );
        assert_eq!(comment, "mangadex.org exists as MangaDex [All]");
    }

    #[test]
    fn functional_existing_comment_keeps_full_name_without_prefix() {
        let comment =
            render_existing_comment("{extensionName}", "mangadex.org", &entry(), None);
        assert_eq!(comment, "Tachiyomi: MangaDex");
    }

    #[test]
    fn regression_configured_name_prefix_with_trailing_space_renders_single_space() {
        let inputs = StaticInputProvider::from_pairs([(NAME_PREFIX_INPUT, "Tachiyomi: ")]);
        let name_prefix = optional_input(&inputs, NAME_PREFIX_INPUT);
        let comment = render_existing_comment(
            "{requestUrl} already exists as {extensionName} ({extensionLang}).",
            "mangadex.org",
            &entry(),
            name_prefix.as_deref(),
        );
        assert_eq!(comment, "mangadex.org already exists as MangaDex (All).");
    }
}
