//! Webhook payload parsing coverage.

use super::*;

#[test]
fn unit_issue_event_keeps_only_action_and_number() {
    let payload = json!({
        "action": "opened",
        "issue": {
            "number": 42,
            "title": "stale title",
            "state": "open",
            "user": {"login": "reporter"}
        },
        "sender": {"login": "reporter"}
    })
    .to_string();

    let event = parse_moderation_event("issues", &payload)
        .expect("parse")
        .expect("relevant event");
    assert_eq!(
        event,
        ModerationEvent::Issue {
            action: IssueAction::Opened,
            issue_number: 42,
        }
    );
}

#[test]
fn unit_comment_event_carries_comment_identity() {
    let payload = json!({
        "action": "created",
        "issue": {"number": 9},
        "comment": {
            "id": 77,
            "node_id": "IC_77",
            "body": "/lock spam",
            "user": {"login": "maintainer"}
        },
        "sender": {"login": "maintainer"}
    })
    .to_string();

    let event = parse_moderation_event("issue_comment", &payload)
        .expect("parse")
        .expect("relevant event");
    assert_eq!(
        event,
        ModerationEvent::Comment {
            action: CommentAction::Created,
            issue_number: 9,
            comment: CommentRef {
                id: 77,
                node_id: "IC_77".to_string(),
                body: "/lock spam".to_string(),
                author_login: "maintainer".to_string(),
            },
        }
    );
}

#[test]
fn regression_payload_without_sender_is_rejected() {
    let payload = json!({"action": "opened", "issue": {"number": 1}}).to_string();
    let error = parse_moderation_event("issues", &payload).expect_err("missing sender");
    assert!(error.to_string().contains("no sender"));
}

#[test]
fn functional_irrelevant_events_and_shapes_are_ignored() {
    let push = json!({"ref": "refs/heads/main", "sender": {"login": "x"}}).to_string();
    assert_eq!(parse_moderation_event("push", &push).expect("parse"), None);

    let comment_without_body =
        json!({"action": "created", "issue": {"number": 3}, "sender": {"login": "x"}}).to_string();
    assert_eq!(
        parse_moderation_event("issue_comment", &comment_without_body).expect("parse"),
        None
    );
}

#[test]
fn unit_issue_actions_round_trip_their_names() {
    for raw in ["opened", "edited", "reopened", "labeled"] {
        assert_eq!(IssueAction::parse(raw).as_str(), raw);
    }
    assert_eq!(CommentAction::parse("deleted"), CommentAction::Other("deleted".to_string()));
}
