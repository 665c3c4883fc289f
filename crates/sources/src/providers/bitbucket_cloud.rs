//! Bitbucket Cloud (bitbucket.org) push events.
//!
//! Bitbucket Cloud signs nothing, so the route fingerprint is the only access
//! control. One delivery may bundle several ref updates; each non-deleted
//! `new` ref becomes its own change, branches and tags alike, in payload
//! order.

use serde::Deserialize;

use super::{decode_json, git_change};
use crate::{SourceError, Verdict, WebhookRequest};

const EVENT_HEADER: &str = "X-Event-Key";
const REPO_PUSH: &str = "repo:push";

#[derive(Debug, Deserialize)]
struct PushPayload {
    repository: Repository,
    push: Push,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

impl Repository {
    fn ssh_url(&self) -> String {
        format!("git@bitbucket.org:{}.git", self.full_name)
    }
}

#[derive(Debug, Deserialize)]
struct Push {
    #[serde(default)]
    changes: Vec<RefChange>,
}

#[derive(Debug, Deserialize)]
struct RefChange {
    /// Null when the ref was deleted.
    new: Option<RefState>,
}

#[derive(Debug, Deserialize)]
struct RefState {
    name: String,
}

pub(crate) fn receive(request: &WebhookRequest) -> Result<Verdict, SourceError> {
    match request.header(EVENT_HEADER) {
        Some(REPO_PUSH) => {}
        other => {
            return Err(SourceError::unexpected_event(
                "Unexpected or missing header X-Event-Key",
                format!("X-Event-Key is {other:?}"),
            ))
        }
    }

    let payload: PushPayload = decode_json(request.body(), "Unable to decode payload as JSON")?;
    let url = payload.repository.ssh_url();

    let changes = payload
        .push
        .changes
        .iter()
        .filter_map(|change| change.new.as_ref())
        .map(|state| git_change(&url, &state.name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Verdict::Forward(changes))
}

#[cfg(test)]
#[path = "bitbucket_cloud_tests.rs"]
mod tests;
