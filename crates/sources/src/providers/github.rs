//! GitHub push webhooks.
//!
//! Deliveries are signed with `X-Hub-Signature-256` (or the legacy
//! `X-Hub-Signature`). The event kind is in `X-GitHub-Event`: `push` becomes a
//! git change, `ping` is answered with `Pong`, and any other kind is accepted
//! without effect because a GitHub hook may be subscribed to more events than
//! hookrelay cares about.

use serde::Deserialize;
use tracing::info;

use super::{decode_json, git_change, hub_payload};
use crate::verification::verify_hub_signature;
use crate::{Secret, SourceError, Verdict, WebhookRequest};

const EVENT_HEADER: &str = "X-GitHub-Event";
const PARSE_REPLY: &str = "Cannot parse payload";

#[derive(Debug, Deserialize)]
struct PushEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    repository: Repository,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default)]
    ssh_url: String,
}

pub(crate) fn receive(secret: &Secret, request: &WebhookRequest) -> Result<Verdict, SourceError> {
    verify_hub_signature(request, secret)
        .map_err(|e| SourceError::unauthenticated("The GitHub signature header is invalid.", e))?;

    let payload = hub_payload(request)?;
    let event = request
        .header(EVENT_HEADER)
        .ok_or_else(|| SourceError::unexpected_event(PARSE_REPLY, "missing X-GitHub-Event"))?;

    match event {
        "push" => {
            let push: PushEvent = decode_json(&payload, PARSE_REPLY)?;
            let change = git_change(&push.repository.ssh_url, &push.git_ref)?;
            Ok(Verdict::Forward(vec![change]))
        }
        "ping" => {
            decode_json::<serde_json::Value>(&payload, PARSE_REPLY)?;
            Ok(Verdict::Acknowledge("Pong"))
        }
        other => {
            decode_json::<serde_json::Value>(&payload, PARSE_REPLY)?;
            info!(source = "GitHub", event = other, "Ignoring unexpected webhook event kind");
            Ok(Verdict::Acknowledge("unexpected hook kind, but OK"))
        }
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
