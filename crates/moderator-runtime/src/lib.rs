//! Runtime for the issue moderator: GitHub collaborators, configuration
//! inputs, and the per-event orchestration of the moderation checks.

pub mod moderator_runtime;

pub use moderator_runtime::{
    catalog_client::{CatalogSource, HttpCatalogClient},
    event_payload::{parse_moderation_event, CommentAction, CommentRef, IssueAction, ModerationEvent},
    github_api_client::GithubApiClient,
    issue_tracker::{IssueTrackerClient, IssueUpdate},
    moderator_inputs::{EnvInputProvider, InputProvider, StaticInputProvider},
    run_moderation, CheckReport, CheckStatus, ModerationContext, ModerationReport, RepoRef,
};
