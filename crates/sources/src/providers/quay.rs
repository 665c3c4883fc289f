//! Quay repository push notifications. Unsigned; the image is `docker_url`.

use serde::Deserialize;

use super::{decode_json, image_change};
use crate::{SourceError, Verdict, WebhookRequest};

#[derive(Debug, Deserialize)]
struct Payload {
    docker_url: String,
}

pub(crate) fn receive(request: &WebhookRequest) -> Result<Verdict, SourceError> {
    let payload: Payload = decode_json(request.body(), "Cannot decode webhook payload")?;
    Ok(Verdict::Forward(vec![image_change(&payload.docker_url)?]))
}

#[cfg(test)]
#[path = "quay_tests.rs"]
mod tests;
