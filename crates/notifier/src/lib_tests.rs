use super::*;
use changes::{ImageName, RefName, RepoUrl};
use mockito::Matcher;
use serde_json::json;

fn notifier(server: &mockito::ServerGuard, path: &str) -> HttpNotifier {
    HttpNotifier::new(reqwest::Client::new(), &format!("{}{}", server.url(), path)).unwrap()
}

#[test]
fn test_notify_url_is_below_api_base() {
    let with_slash =
        HttpNotifier::new(reqwest::Client::new(), "http://localhost:3030/api/flux/").unwrap();
    let without = HttpNotifier::new(reqwest::Client::new(), DEFAULT_API_BASE).unwrap();

    assert_eq!(with_slash.notify_url().as_str(), "http://localhost:3030/api/flux/v11/notify");
    assert_eq!(without.notify_url(), with_slash.notify_url());
}

#[test]
fn test_relative_api_base_is_rejected() {
    let err = HttpNotifier::new(reqwest::Client::new(), "api/flux").unwrap_err();

    assert_eq!(err.url, "api/flux");
}

#[tokio::test]
async fn test_git_change_is_posted_as_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/flux/v11/notify")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "Kind": "git",
            "Source": {"URL": "git@github.com:org/repo.git", "Branch": "main"}
        })))
        .with_status(200)
        .create_async()
        .await;

    let change = Change::git(
        RepoUrl::new("git@github.com:org/repo.git").unwrap(),
        RefName::new("main").unwrap(),
    );
    notifier(&server, "/api/flux").notify_change(&change).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_image_change_is_posted_as_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v11/notify")
        .match_body(Matcher::Json(json!({
            "Kind": "image",
            "Source": {"Name": {"Domain": "", "Image": "library/alpine"}}
        })))
        .with_status(204)
        .create_async()
        .await;

    let change = Change::image(ImageName {
        domain: String::new(),
        image: "library/alpine".to_string(),
    });
    notifier(&server, "").notify_change(&change).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v11/notify")
        .with_status(503)
        .with_body("daemon unavailable")
        .create_async()
        .await;

    let change = Change::image(ImageName {
        domain: "quay.io".to_string(),
        image: "org/app".to_string(),
    });
    let err = notifier(&server, "").notify_change(&change).await.unwrap_err();

    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "daemon unavailable");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let notifier = HttpNotifier::new(reqwest::Client::new(), "http://127.0.0.1:9").unwrap();
    let change = Change::image(ImageName {
        domain: String::new(),
        image: "alpine".to_string(),
    });

    let err = notifier.notify_change(&change).await.unwrap_err();

    assert!(matches!(err, NotifyError::Transport { .. }));
}
