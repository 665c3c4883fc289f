//! Harbor `pushImage` events, authenticated by an `Authorization` header
//! equal to the shared secret.
//!
//! A push may list several resources of the same repository; only the first
//! is forwarded since they all name the same image.

use serde::Deserialize;

use super::{decode_json, image_change};
use crate::verification::verify_shared_secret;
use crate::{Secret, SourceError, Verdict, WebhookRequest};

const PUSH_IMAGE: &str = "pushImage";

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    event_data: EventData,
}

#[derive(Debug, Default, Deserialize)]
struct EventData {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    resource_url: String,
}

pub(crate) fn receive(secret: &Secret, request: &WebhookRequest) -> Result<Verdict, SourceError> {
    verify_shared_secret(request, "Authorization", secret)
        .map_err(|e| SourceError::unauthenticated("The Harbor token does not match", e))?;

    let payload: Payload = decode_json(request.body(), "Cannot decode webhook payload")?;
    if payload.kind != PUSH_IMAGE {
        return Err(SourceError::unexpected_event(
            "Unexpected event type",
            format!("event type '{}'", payload.kind),
        ));
    }

    let resource = payload.event_data.resources.first().ok_or_else(|| {
        SourceError::malformed("Cannot decode webhook payload", "pushImage event has no resources")
    })?;
    Ok(Verdict::Forward(vec![image_change(&resource.resource_url)?]))
}

#[cfg(test)]
#[path = "harbor_tests.rs"]
mod tests;
