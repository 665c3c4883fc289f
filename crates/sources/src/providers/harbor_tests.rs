use super::*;
use crate::providers::test_support::RequestBuilder;
use changes::{Change, ImageName};

const PUSH: &str = r#"{
    "type": "pushImage",
    "occur_at": 1582640688,
    "operator": "admin",
    "event_data": {
        "resources": [
            {"digest": "sha256:8a9e", "tag": "v1", "resource_url": "harbor.example.com/library/alpine:v1"},
            {"digest": "sha256:0c1d", "tag": "v2", "resource_url": "harbor.example.com/library/alpine:v2"}
        ],
        "repository": {"name": "alpine", "namespace": "library", "repo_full_name": "library/alpine"}
    }
}"#;

fn secret() -> Secret {
    Secret::new("harbor-auth-header")
}

#[test]
fn test_first_resource_becomes_image_change() {
    let request = RequestBuilder::json(PUSH)
        .header("Authorization", "harbor-auth-header")
        .build();

    let verdict = receive(&secret(), &request).unwrap();

    assert_eq!(
        verdict,
        Verdict::Forward(vec![Change::image(ImageName {
            domain: "harbor.example.com".to_string(),
            image: "library/alpine".to_string(),
        })])
    );
}

#[test]
fn test_wrong_authorization_is_unauthenticated() {
    let request = RequestBuilder::json(PUSH)
        .header("Authorization", "Bearer something")
        .build();

    let err = receive(&secret(), &request).unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(err.reply(), "The Harbor token does not match");
}

#[test]
fn test_other_event_type_is_rejected() {
    let body = PUSH.replace("pushImage", "deleteImage");
    let request = RequestBuilder::json(body)
        .header("Authorization", "harbor-auth-header")
        .build();

    let err = receive(&secret(), &request).unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.reply(), "Unexpected event type");
}

#[test]
fn test_push_without_resources_is_malformed() {
    let request = RequestBuilder::json(r#"{"type":"pushImage","event_data":{"resources":[]}}"#)
        .header("Authorization", "harbor-auth-header")
        .build();

    assert!(matches!(
        receive(&secret(), &request),
        Err(SourceError::MalformedPayload { .. })
    ));
}
