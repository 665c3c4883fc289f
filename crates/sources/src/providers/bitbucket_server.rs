//! Bitbucket Server (self-hosted) `repo:refs_changed` events.
//!
//! Signed like GitHub deliveries. Only `BRANCH` ref changes are forwarded;
//! ref ids are de-duplicated keeping first-seen order.

use serde::Deserialize;
use tracing::debug;

use super::{decode_json, git_change, hub_payload};
use crate::verification::verify_hub_signature;
use crate::{Secret, SourceError, Verdict, WebhookRequest};

const EVENT_HEADER: &str = "X-Event-Key";
const REFS_CHANGED: &str = "repo:refs_changed";
const BRANCH: &str = "BRANCH";
const SSH_LINK: &str = "ssh";

#[derive(Debug, Deserialize)]
struct RefsChangedEvent {
    repository: Repository,
    #[serde(default)]
    changes: Vec<RefChange>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    clone: Vec<CloneLink>,
}

#[derive(Debug, Deserialize)]
struct CloneLink {
    href: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RefChange {
    #[serde(rename = "ref")]
    git_ref: Ref,
}

#[derive(Debug, Deserialize)]
struct Ref {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RefsChangedEvent {
    fn clone_link(&self, name: &str) -> Option<&str> {
        self.repository
            .links
            .clone
            .iter()
            .find(|link| link.name == name)
            .map(|link| link.href.as_str())
    }

    fn branch_ref_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for change in &self.changes {
            let id = change.git_ref.id.as_str();
            if change.git_ref.kind == BRANCH && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

pub(crate) fn receive(secret: &Secret, request: &WebhookRequest) -> Result<Verdict, SourceError> {
    verify_hub_signature(request, secret)
        .map_err(|e| SourceError::unauthenticated("The signature header is invalid.", e))?;

    match request.header(EVENT_HEADER) {
        Some(REFS_CHANGED) => {}
        other => {
            return Err(SourceError::unexpected_event(
                "Unexpected or missing header X-Event-Key",
                format!("X-Event-Key is {other:?}"),
            ))
        }
    }

    let payload = hub_payload(request)?;
    let event: RefsChangedEvent = decode_json(&payload, "Unable to JSON decode payload")?;
    let url = event.clone_link(SSH_LINK).ok_or_else(|| {
        SourceError::malformed("Missing repository SSH clone link", "no clone link named 'ssh'")
    })?;

    let changes = event
        .branch_ref_ids()
        .into_iter()
        .map(|id| git_change(url, id))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(source = "BitbucketServer", count = changes.len(), "Collected branch changes");
    Ok(Verdict::Forward(changes))
}

#[cfg(test)]
#[path = "bitbucket_server_tests.rs"]
mod tests;
