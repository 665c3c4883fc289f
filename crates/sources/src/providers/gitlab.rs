//! GitLab push hooks, authenticated by the `X-Gitlab-Token` shared secret.

use serde::Deserialize;

use super::{decode_json, git_change};
use crate::verification::verify_shared_secret;
use crate::{Secret, SourceError, Verdict, WebhookRequest};

const TOKEN_HEADER: &str = "X-Gitlab-Token";
const EVENT_HEADER: &str = "X-Gitlab-Event";
const PUSH_HOOK: &str = "Push Hook";

#[derive(Debug, Deserialize)]
struct PushHook {
    #[serde(rename = "ref")]
    git_ref: String,
    project: Project,
}

#[derive(Debug, Deserialize)]
struct Project {
    #[serde(default)]
    git_ssh_url: String,
}

pub(crate) fn receive(secret: &Secret, request: &WebhookRequest) -> Result<Verdict, SourceError> {
    verify_shared_secret(request, TOKEN_HEADER, secret)
        .map_err(|e| SourceError::unauthenticated("The Gitlab token does not match", e))?;

    match request.header(EVENT_HEADER) {
        Some(PUSH_HOOK) => {}
        other => {
            return Err(SourceError::unexpected_event(
                "Unexpected or missing X-Gitlab-Event",
                format!("X-Gitlab-Event is {other:?}"),
            ))
        }
    }

    let hook: PushHook = decode_json(request.body(), "Unable to parse hook payload")?;
    let change = git_change(&hook.project.git_ssh_url, &hook.git_ref)?;
    Ok(Verdict::Forward(vec![change]))
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;
