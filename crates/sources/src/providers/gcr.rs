//! Google Container Registry notifications delivered by a Pub/Sub push
//! subscription.
//!
//! The outer body is a Pub/Sub envelope whose `message.data` is base64 JSON
//! naming the action and the pushed tag. Only `insert` actions are
//! forwarded. When the endpoint has an audience configured, the push must
//! carry a Google-signed bearer token minted for that audience.
//!
//! Authentication and envelope failures are reported to the push
//! infrastructure as 200; see [`crate::Source::masks_rejection`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{decode_json, image_change};
use crate::verification::{verify_bearer_audience, TokenVerifier};
use crate::{SourceError, Verdict, WebhookRequest};

const INSERT: &str = "insert";

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    message: PubSubMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PubSubMessage {
    #[serde(default)]
    data: String,
    #[serde(default)]
    message_id: String,
    #[serde(default)]
    publish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    subscription: String,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryNotification {
    #[serde(default)]
    action: String,
    #[serde(default)]
    digest: String,
    #[serde(default)]
    tag: String,
}

impl PubSubMessage {
    /// Decodes `data`. Undecodable data reads as an empty notification.
    fn notification(&self) -> RegistryNotification {
        STANDARD
            .decode(&self.data)
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default()
    }
}

pub(crate) async fn receive(
    audience: Option<&str>,
    verifier: &dyn TokenVerifier,
    request: &WebhookRequest,
) -> Result<Verdict, SourceError> {
    if let Some(audience) = audience {
        verify_bearer_audience(verifier, request, audience)
            .await
            .map_err(|e| SourceError::unauthenticated("Cannot authorize request", e))?;
    }

    let envelope: PushEnvelope = decode_json(request.body(), "Cannot decode payload")?;
    let message = envelope.message;
    debug!(
        message_id = %message.message_id,
        subscription = %message.subscription,
        publish_time = ?message.publish_time,
        "Received Pub/Sub push"
    );

    let notification = message.notification();
    if !notification.action.eq_ignore_ascii_case(INSERT) {
        return Ok(Verdict::Acknowledge("action is not an insert, moving on"));
    }

    info!(tag = %notification.tag, digest = %notification.digest, "Container Registry insert");
    Ok(Verdict::Forward(vec![image_change(&notification.tag)?]))
}

#[cfg(test)]
#[path = "gcr_tests.rs"]
mod tests;
