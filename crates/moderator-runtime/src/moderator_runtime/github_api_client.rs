use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use moderator_core::{IssueSnapshot, LockReason};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::event_payload::GithubIssue;
use super::issue_tracker::{IssueTrackerClient, IssueUpdate};
use super::RepoRef;

const MINIMIZE_COMMENT_MUTATION: &str = "mutation MinimizeComment($input: MinimizeCommentInput!) { minimizeComment(input: $input) { clientMutationId } }";
const DELETE_ISSUE_MUTATION: &str = "mutation DeleteIssue($input: DeleteIssueInput!) { deleteIssue(input: $input) { clientMutationId } }";
const ERROR_BODY_MAX_CHARS: usize = 800;
const PAGE_SIZE: usize = 100;

pub(crate) fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut truncated = body.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Clone)]
/// REST + GraphQL implementation of [`IssueTrackerClient`] for one repository.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    graphql_url: String,
    repo: RepoRef,
}

impl GithubApiClient {
    pub fn new(
        api_base: String,
        graphql_url: Option<String>,
        token: String,
        repo: RepoRef,
        request_timeout_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("issue-moderator"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        let api_base = api_base.trim_end_matches('/').to_string();
        let graphql_url = graphql_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{api_base}/graphql"));
        Ok(Self {
            http: client,
            api_base,
            graphql_url,
            repo,
        })
    }

    fn issue_url(&self, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, self.repo.owner, self.repo.name, issue_number
        )
    }

    async fn send_checked(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        bail!(
            "github api {operation} failed with status {}: {}",
            status.as_u16(),
            truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
        );
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_checked(operation, request)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation}"))
    }

    async fn request_empty(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<()> {
        self.send_checked(operation, request).await.map(|_| ())
    }

    async fn graphql_mutation(&self, operation: &str, query: &str, input: Value) -> Result<()> {
        let payload = json!({
            "query": query,
            "variables": { "input": input },
        });
        let response: GraphqlResponse = self
            .request_json(operation, self.http.post(&self.graphql_url).json(&payload))
            .await?;
        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            bail!(
                "github graphql {operation} failed: {}",
                truncate_for_error(&messages, ERROR_BODY_MAX_CHARS)
            );
        }
        Ok(())
    }
}

#[async_trait]
impl IssueTrackerClient for GithubApiClient {
    async fn get_issue(&self, issue_number: u64) -> Result<IssueSnapshot> {
        let issue: GithubIssue = self
            .request_json("get issue", self.http.get(self.issue_url(issue_number)))
            .await?;
        Ok(issue.into_snapshot())
    }

    async fn list_open_issues(&self, label: &str) -> Result<Vec<IssueSnapshot>> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let per_page = PAGE_SIZE.to_string();
            let request = self
                .http
                .get(format!(
                    "{}/repos/{}/{}/issues",
                    self.api_base, self.repo.owner, self.repo.name
                ))
                .query(&[
                    ("state", "open"),
                    ("labels", label),
                    ("per_page", per_page.as_str()),
                    ("page", page_value.as_str()),
                ]);
            let chunk: Vec<GithubIssue> = self.request_json("list issues", request).await?;
            let chunk_len = chunk.len();
            rows.extend(
                chunk
                    .into_iter()
                    .filter(|issue| issue.pull_request.is_none())
                    .map(GithubIssue::into_snapshot),
            );
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn update_issue(&self, issue_number: u64, update: &IssueUpdate) -> Result<()> {
        let mut payload = Map::new();
        if let Some(state) = update.state {
            payload.insert("state".to_string(), json!(state.as_str()));
        }
        if let Some(state_reason) = update.state_reason {
            payload.insert("state_reason".to_string(), json!(state_reason.as_str()));
        }
        if let Some(title) = update.title.as_deref() {
            payload.insert("title".to_string(), json!(title));
        }
        self.request_empty(
            "update issue",
            self.http
                .patch(self.issue_url(issue_number))
                .json(&Value::Object(payload)),
        )
        .await
    }

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<()> {
        let payload = json!({ "labels": labels });
        self.request_empty(
            "add labels",
            self.http
                .post(format!("{}/labels", self.issue_url(issue_number)))
                .json(&payload),
        )
        .await
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<()> {
        let payload = json!({ "body": body });
        self.request_empty(
            "create issue comment",
            self.http
                .post(format!("{}/comments", self.issue_url(issue_number)))
                .json(&payload),
        )
        .await
    }

    async fn lock_issue(&self, issue_number: u64, reason: Option<LockReason>) -> Result<()> {
        let payload = match reason {
            Some(reason) => json!({ "lock_reason": reason.as_str() }),
            None => json!({}),
        };
        self.request_empty(
            "lock issue",
            self.http
                .put(format!("{}/lock", self.issue_url(issue_number)))
                .json(&payload),
        )
        .await
    }

    async fn delete_issue(&self, issue_node_id: &str) -> Result<()> {
        self.graphql_mutation(
            "delete issue",
            DELETE_ISSUE_MUTATION,
            json!({ "issueId": issue_node_id }),
        )
        .await
    }

    async fn minimize_comment(&self, comment_node_id: &str) -> Result<()> {
        self.graphql_mutation(
            "minimize comment",
            MINIMIZE_COMMENT_MUTATION,
            json!({ "classifier": "RESOLVED", "subjectId": comment_node_id }),
        )
        .await
    }

    async fn check_org_membership(&self, org: &str, username: &str) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/orgs/{org}/members/{username}", self.api_base))
            .send()
            .await
            .context("github api check org membership request failed")?;
        let status = response.status();
        match status.as_u16() {
            204 => Ok(true),
            302 | 404 => Ok(false),
            _ => {
                let body = response.text().await.unwrap_or_default();
                bail!(
                    "github api check org membership failed with status {}: {}",
                    status.as_u16(),
                    truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
                );
            }
        }
    }
}
