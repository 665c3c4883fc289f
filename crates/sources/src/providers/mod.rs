//! One module per webhook provider.
//!
//! Each module exposes a `receive` function that verifies and parses a
//! [`WebhookRequest`] into a [`Verdict`]. [`crate::Source`] selects which one
//! runs; nothing here is reachable except through it.

use std::borrow::Cow;

use changes::{Change, ImageRef, RefName, RepoUrl};
use serde::de::DeserializeOwned;

use crate::{SourceError, WebhookRequest};

pub(crate) mod bitbucket_cloud;
pub(crate) mod bitbucket_server;
pub(crate) mod dockerhub;
pub(crate) mod gcr;
pub(crate) mod github;
pub(crate) mod gitlab;
pub(crate) mod harbor;
pub(crate) mod nexus;
pub(crate) mod quay;

/// Decodes a JSON body, mapping failures to a 400 with `reply` as the body.
pub(crate) fn decode_json<T: DeserializeOwned>(
    body: &[u8],
    reply: &'static str,
) -> Result<T, SourceError> {
    serde_json::from_slice(body).map_err(|e| SourceError::malformed(reply, e))
}

/// Builds a git change, rejecting payloads with an empty URL or ref.
pub(crate) fn git_change(url: &str, git_ref: &str) -> Result<Change, SourceError> {
    let url = RepoUrl::new(url).ok_or_else(|| {
        SourceError::malformed("Missing repository URL in payload", "empty clone URL")
    })?;
    let branch = RefName::from_ref(git_ref).ok_or_else(|| {
        SourceError::malformed("Missing ref in payload", format!("empty ref '{git_ref}'"))
    })?;
    Ok(Change::git(url, branch))
}

/// Builds an image change from a raw image string. Tags are dropped.
pub(crate) fn image_change(raw: &str) -> Result<Change, SourceError> {
    let reference = ImageRef::parse(raw).map_err(|source| SourceError::InvalidImage {
        image: raw.to_string(),
        source,
    })?;
    Ok(Change::image(reference.name))
}

/// Extracts the JSON document from a GitHub-style delivery.
///
/// `application/json` bodies are the document; form-encoded bodies carry it
/// in the `payload` field. Signatures always cover the raw body, so this runs
/// after verification.
pub(crate) fn hub_payload(request: &WebhookRequest) -> Result<Cow<'_, [u8]>, SourceError> {
    const REPLY: &str = "Cannot parse payload";

    match request.content_type().as_deref() {
        Some("application/json") => Ok(Cow::Borrowed(request.body())),
        Some("application/x-www-form-urlencoded") => url::form_urlencoded::parse(request.body())
            .find(|(key, _)| key == "payload")
            .map(|(_, value)| Cow::Owned(value.into_owned().into_bytes()))
            .ok_or_else(|| SourceError::malformed(REPLY, "form body has no 'payload' field")),
        Some(other) => Err(SourceError::malformed(
            REPLY,
            format!("unsupported Content-Type '{other}'"),
        )),
        None => Err(SourceError::malformed(REPLY, "missing Content-Type")),
    }
}

#[cfg(test)]
#[path = "test_support.rs"]
pub(crate) mod test_support;
