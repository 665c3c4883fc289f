//! Sonatype Nexus repository-component webhooks.
//!
//! Nexus signs the body with a bare hex HMAC-SHA1 in
//! `X-Nexus-Webhook-Signature`. Its payload names the component but not the
//! registry host, which comes from the endpoint configuration instead.

use serde::Deserialize;

use super::{decode_json, image_change};
use crate::verification::{verify_hex_digest, HmacAlgorithm};
use crate::{Secret, SourceError, Verdict, VerificationError, WebhookRequest};

const WEBHOOK_ID_HEADER: &str = "X-Nexus-Webhook-Id";
const SIGNATURE_HEADER: &str = "X-Nexus-Webhook-Signature";
const COMPONENT_WEBHOOK: &str = "rm:repository:component";

#[derive(Debug, Deserialize)]
struct Payload {
    action: String,
    component: Component,
}

#[derive(Debug, Deserialize)]
struct Component {
    format: String,
    name: String,
}

pub(crate) fn receive(
    secret: &Secret,
    registry_host: Option<&str>,
    request: &WebhookRequest,
) -> Result<Verdict, SourceError> {
    match request.header(WEBHOOK_ID_HEADER) {
        Some(COMPONENT_WEBHOOK) => {}
        other => {
            return Err(SourceError::unexpected_event(
                "Unsupported webhook ID",
                format!("X-Nexus-Webhook-Id is {other:?}"),
            ))
        }
    }

    let signature = request
        .header(SIGNATURE_HEADER)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SourceError::unauthenticated(
                "Signature is missing from header",
                VerificationError::MissingHeader(SIGNATURE_HEADER),
            )
        })?;
    verify_hex_digest(HmacAlgorithm::Sha1, secret, request.body(), signature)
        .map_err(|e| SourceError::unauthenticated("Invalid signature", e))?;

    let payload: Payload = decode_json(request.body(), "Cannot decode webhook payload")?;
    if payload.component.format != "docker" || payload.action != "CREATED" {
        return Err(SourceError::unexpected_event(
            "Ignoring component format",
            format!(
                "action '{}' for format '{}'",
                payload.action, payload.component.format
            ),
        ));
    }

    let image = match registry_host {
        Some(host) => format!("{}/{}", host.trim_end_matches('/'), payload.component.name),
        None => payload.component.name,
    };
    Ok(Verdict::Forward(vec![image_change(&image)?]))
}

#[cfg(test)]
#[path = "nexus_tests.rs"]
mod tests;
