use anyhow::{Context, Result};
use moderator_runtime::{
    parse_moderation_event, run_moderation, GithubApiClient, HttpCatalogClient, InputProvider,
    ModerationContext, ModerationReport, RepoRef,
};
use tracing::info;

use crate::cli_args::Cli;

/// Load the event named by `cli`, build the collaborators, and moderate it.
pub(crate) async fn run_cli_with_inputs(
    cli: &Cli,
    inputs: &dyn InputProvider,
) -> Result<ModerationReport> {
    let payload = tokio::fs::read_to_string(&cli.event_path)
        .await
        .with_context(|| format!("failed to read event payload {}", cli.event_path.display()))?;
    let Some(event) = parse_moderation_event(&cli.event_name, &payload)? else {
        info!(event_name = %cli.event_name, "irrelevant event trigger");
        return Ok(ModerationReport::default());
    };

    let repo = RepoRef::parse(&cli.repo)?;
    let tracker = GithubApiClient::new(
        cli.api_base.clone(),
        cli.graphql_url.clone(),
        cli.github_token.clone(),
        repo.clone(),
        cli.request_timeout_ms,
    )?;
    let catalog = HttpCatalogClient::new(cli.request_timeout_ms)?;
    let context = ModerationContext {
        tracker: &tracker,
        catalog: &catalog,
        inputs,
        repo: &repo,
    };
    Ok(run_moderation(&context, &event).await)
}

/// `::error::` workflow command lines for every failed check.
pub(crate) fn render_failure_annotations(report: &ModerationReport) -> Vec<String> {
    report
        .failures()
        .into_iter()
        .map(|failure| format!("::error::{}", failure.replace('\n', "%0A")))
        .collect()
}
