use super::*;
use crate::providers::test_support::RequestBuilder;
use changes::{Change, RefName, RepoUrl};

const PUSH: &str = r#"{
    "object_kind": "push",
    "ref": "refs/heads/master",
    "checkout_sha": "da1560886d4f094c3e6c9ef40349f7d38b5d27d7",
    "project": {
        "id": 15,
        "name": "Diaspora",
        "git_ssh_url": "git@example.com:mike/diaspora.git",
        "git_http_url": "http://example.com/mike/diaspora.git"
    },
    "commits": []
}"#;

fn secret() -> Secret {
    Secret::new("gitlab-shared-token")
}

#[test]
fn test_push_hook_becomes_git_change() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Token", "gitlab-shared-token")
        .header("X-Gitlab-Event", "Push Hook")
        .build();

    let verdict = receive(&secret(), &request).unwrap();

    assert_eq!(
        verdict,
        Verdict::Forward(vec![Change::git(
            RepoUrl::new("git@example.com:mike/diaspora.git").unwrap(),
            RefName::new("master").unwrap(),
        )])
    );
}

#[test]
fn test_token_mismatch_is_unauthenticated() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Token", "guess")
        .header("X-Gitlab-Event", "Push Hook")
        .build();

    let err = receive(&secret(), &request).unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(err.reply(), "The Gitlab token does not match");
}

#[test]
fn test_missing_token_is_unauthenticated() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Event", "Push Hook")
        .build();

    assert_eq!(receive(&secret(), &request).unwrap_err().status(), 401);
}

#[test]
fn test_token_is_checked_before_event() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Token", "guess")
        .header("X-Gitlab-Event", "Tag Push Hook")
        .build();

    assert_eq!(receive(&secret(), &request).unwrap_err().status(), 401);
}

#[test]
fn test_other_event_is_rejected() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Token", "gitlab-shared-token")
        .header("X-Gitlab-Event", "Merge Request Hook")
        .build();

    let err = receive(&secret(), &request).unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.reply(), "Unexpected or missing X-Gitlab-Event");
}

#[test]
fn test_missing_event_is_rejected() {
    let request = RequestBuilder::json(PUSH)
        .header("X-Gitlab-Token", "gitlab-shared-token")
        .build();

    assert_eq!(receive(&secret(), &request).unwrap_err().status(), 400);
}

#[test]
fn test_garbage_body_is_malformed() {
    let request = RequestBuilder::json("not json")
        .header("X-Gitlab-Token", "gitlab-shared-token")
        .header("X-Gitlab-Event", "Push Hook")
        .build();

    let err = receive(&secret(), &request).unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.reply(), "Unable to parse hook payload");
}

#[test]
fn test_empty_clone_url_is_malformed() {
    let request = RequestBuilder::json(r#"{"ref":"refs/heads/master","project":{}}"#)
        .header("X-Gitlab-Token", "gitlab-shared-token")
        .header("X-Gitlab-Event", "Push Hook")
        .build();

    assert!(matches!(
        receive(&secret(), &request),
        Err(SourceError::MalformedPayload { .. })
    ));
}
