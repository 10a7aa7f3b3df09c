use httpmock::prelude::*;
use moderator_runtime::{
    parse_moderation_event, run_moderation, CheckStatus, GithubApiClient, HttpCatalogClient,
    ModerationContext, ModerationReport, RepoRef, StaticInputProvider,
};
use serde_json::{json, Value};

fn api_issue(number: u64, state: &str, body: &str, labels: &[&str]) -> Value {
    json!({
        "number": number,
        "node_id": format!("I_{number}"),
        "title": format!("Issue {number}"),
        "body": body,
        "state": state,
        "user": {"login": "reporter"},
        "labels": labels.iter().map(|name| json!({"name": name})).collect::<Vec<_>>()
    })
}

async fn moderate_payload(
    server: &MockServer,
    inputs: &StaticInputProvider,
    event_name: &str,
    payload: Value,
) -> ModerationReport {
    let repo = RepoRef::parse("owner/repo").expect("repo");
    let tracker = GithubApiClient::new(
        server.base_url(),
        None,
        "token".to_string(),
        repo.clone(),
        5_000,
    )
    .expect("tracker");
    let catalog = HttpCatalogClient::new(5_000).expect("catalog client");
    let event = parse_moderation_event(event_name, &payload.to_string())
        .expect("payload")
        .expect("relevant event");
    let context = ModerationContext {
        tracker: &tracker,
        catalog: &catalog,
        inputs,
        repo: &repo,
    };
    run_moderation(&context, &event).await
}

#[tokio::test]
async fn integration_duplicate_command_from_org_member_labels_and_closes() {
    let server = MockServer::start();
    let membership = server.mock(|when, then| {
        when.method(GET).path("/orgs/owner/members/maintainer");
        then.status(204);
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/5");
        then.status(200).json_body(api_issue(5, "open", "", &[]));
    });
    let label = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/owner/repo/issues/5/labels")
            .json_body(json!({"labels": ["duplicate"]}));
        then.status(200).json_body(json!([{"name": "duplicate"}]));
    });
    let close = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/owner/repo/issues/5")
            .json_body(json!({"state": "closed", "state_reason": "not_planned"}));
        then.status(200).json_body(api_issue(5, "closed", "", &["duplicate"]));
    });
    let minimize = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(json!({"data": {}}));
    });

    let report = moderate_payload(
        &server,
        &StaticInputProvider::default(),
        "issue_comment",
        json!({
            "action": "created",
            "issue": {"number": 5, "state": "open"},
            "comment": {
                "id": 50,
                "node_id": "IC_50",
                "body": "/duplicate of #4",
                "user": {"login": "maintainer"}
            },
            "sender": {"login": "maintainer"}
        }),
    )
    .await;

    assert!(report.is_success(), "{:?}", report.failures());
    membership.assert_calls(1);
    get.assert_calls(1);
    label.assert_calls(1);
    close.assert_calls(1);
    minimize.assert_calls(0);
}

#[tokio::test]
async fn integration_command_from_non_member_touches_nothing() {
    let server = MockServer::start();
    let membership = server.mock(|when, then| {
        when.method(GET).path("/orgs/owner/members/stranger");
        then.status(404);
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/5");
        then.status(200).json_body(api_issue(5, "open", "", &[]));
    });

    let report = moderate_payload(
        &server,
        &StaticInputProvider::default(),
        "issue_comment",
        json!({
            "action": "created",
            "issue": {"number": 5},
            "comment": {
                "id": 51,
                "node_id": "IC_51",
                "body": "/lock spam",
                "user": {"login": "stranger"}
            },
            "sender": {"login": "stranger"}
        }),
    )
    .await;

    assert!(report.is_success());
    assert!(matches!(
        report.status_of("command"),
        Some(CheckStatus::Skipped(_))
    ));
    membership.assert_calls(1);
    get.assert_calls(0);
}

#[tokio::test]
async fn integration_opened_request_is_closed_by_catalog_then_skipped_by_duplicate_check() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/10");
        then.status(200).json_body(api_issue(
            10,
            "open",
            "Please add https://www.mangadex.org/",
            &["source request"],
        ));
    });
    let catalog = server.mock(|when, then| {
        when.method(GET).path("/catalog/index.min.json");
        then.status(200).json_body(json!([{
            "name": "Tachiyomi: MangaDex",
            "lang": "all",
            "sources": [{"baseUrl": "https://mangadex.org"}]
        }]));
    });
    let label = server.mock(|when, then| {
        when.method(POST).path("/repos/owner/repo/issues/10/labels");
        then.status(200).json_body(json!([]));
    });
    let close = server.mock(|when, then| {
        when.method(PATCH).path("/repos/owner/repo/issues/10");
        then.status(200).json_body(json!({}));
    });
    let comment = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/owner/repo/issues/10/comments")
            .body_includes("mangadex.org is already available as MangaDex (All).");
        then.status(201).json_body(json!({"id": 1}));
    });
    let list = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues");
        then.status(200).json_body(json!([]));
    });

    let catalog_url = server.url("/catalog/index.min.json");
    let inputs = StaticInputProvider::from_pairs([
        ("existing-check-enabled", "true"),
        ("existing-check-labels", r#"["source request"]"#),
        ("existing-check-repo-url", catalog_url.as_str()),
        ("existing-check-name-prefix", "Tachiyomi: "),
        ("duplicate-check-enabled", "true"),
        ("duplicate-check-labels", r#"["source request"]"#),
    ]);

    let report = moderate_payload(
        &server,
        &inputs,
        "issues",
        json!({
            "action": "opened",
            "issue": {"number": 10},
            "sender": {"login": "reporter"}
        }),
    )
    .await;

    assert!(report.is_success(), "{:?}", report.failures());
    assert!(matches!(
        report.status_of("existing-source"),
        Some(CheckStatus::Acted(_))
    ));
    catalog.assert_calls(1);
    label.assert_calls(1);
    close.assert_calls(1);
    comment.assert_calls(1);
    // The mock keeps returning "open", so the duplicate check still runs its query.
    list.assert_calls(1);
    get.assert_calls(2);
}
