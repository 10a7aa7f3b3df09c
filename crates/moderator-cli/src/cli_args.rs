use std::path::PathBuf;

use clap::Parser;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

/// Process settings for one moderation run. Moderation inputs themselves are
/// read from `INPUT_<NAME>` variables, not flags.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "issue-moderator",
    about = "Moderates GitHub issues and issue comments from a single webhook event",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "event-name",
        env = "GITHUB_EVENT_NAME",
        help = "Webhook event name (issues, issue_comment)"
    )]
    pub(crate) event_name: String,

    #[arg(
        long = "event-path",
        env = "GITHUB_EVENT_PATH",
        help = "Path to the webhook event payload JSON"
    )]
    pub(crate) event_path: PathBuf,

    #[arg(
        long = "repo",
        env = "GITHUB_REPOSITORY",
        help = "Repository in owner/repo form"
    )]
    pub(crate) repo: String,

    #[arg(
        long = "github-token",
        env = "INPUT_REPO-TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access"
    )]
    pub(crate) github_token: String,

    #[arg(
        long = "api-base",
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "GitHub REST API base URL"
    )]
    pub(crate) api_base: String,

    #[arg(
        long = "graphql-url",
        env = "GITHUB_GRAPHQL_URL",
        help = "GitHub GraphQL endpoint (defaults to <api-base>/graphql)"
    )]
    pub(crate) graphql_url: Option<String>,

    #[arg(
        long = "request-timeout-ms",
        env = "ISSUE_MODERATOR_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub or catalog request in milliseconds"
    )]
    pub(crate) request_timeout_ms: u64,
}
