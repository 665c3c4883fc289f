//! DockerHub repository push notifications. Unsigned.

use serde::Deserialize;

use super::{decode_json, image_change};
use crate::{SourceError, Verdict, WebhookRequest};

#[derive(Debug, Deserialize)]
struct Payload {
    repository: Repository,
}

#[derive(Debug, Deserialize)]
struct Repository {
    repo_name: String,
}

pub(crate) fn receive(request: &WebhookRequest) -> Result<Verdict, SourceError> {
    let payload: Payload = decode_json(request.body(), "Cannot decode webhook payload")?;
    Ok(Verdict::Forward(vec![image_change(&payload.repository.repo_name)?]))
}

#[cfg(test)]
#[path = "dockerhub_tests.rs"]
mod tests;
