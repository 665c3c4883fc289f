//! Reusable authenticity checks shared by the source adapters.
//!
//! | Scheme | Used by | Function |
//! |--------|---------|----------|
//! | `<algo>=<hex>` HMAC header | GitHub, Bitbucket Server | [`verify_hub_signature`] |
//! | bare hex HMAC-SHA1 header | Nexus | [`verify_hex_digest`] |
//! | header equals shared secret | GitLab, Harbor | [`verify_shared_secret`] |
//! | bearer token audience | Google Container Registry | [`verify_bearer_audience`] |
//!
//! DockerHub, Quay and Bitbucket Cloud offer no scheme at all; for them the
//! route fingerprint is the only access control.
//!
//! All byte comparisons against secret-derived values are constant-time:
//! HMAC digests go through [`Mac::verify_slice`], text through
//! [`subtle::ConstantTimeEq`].

use async_trait::async_trait;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{Secret, VerificationError, WebhookRequest};

/// Preferred GitHub-style signature header (SHA-256).
pub const HUB_SIGNATURE_256: &str = "X-Hub-Signature-256";
/// Legacy GitHub-style signature header (usually SHA-1).
pub const HUB_SIGNATURE: &str = "X-Hub-Signature";

const BEARER_PREFIX: &str = "Bearer ";

// ---------------------------------------------------------------------------
// HMAC
// ---------------------------------------------------------------------------

/// Digest algorithm behind an HMAC signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl HmacAlgorithm {
    /// Maps a signature prefix (`"sha1"`, `"sha256"`, `"sha512"`) to an algorithm.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Returns the signature prefix for this algorithm.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

fn keyed_mac<M: Mac + KeyInit>(key: &[u8], body: &[u8]) -> Result<M, VerificationError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| VerificationError::InvalidKey)?;
    mac.update(body);
    Ok(mac)
}

fn keyed_digest<M: Mac + KeyInit>(
    key: &[u8],
    body: &[u8],
) -> Result<Vec<u8>, VerificationError> {
    Ok(keyed_mac::<M>(key, body)?.finalize().into_bytes().to_vec())
}

fn check_digest<M: Mac + KeyInit>(
    key: &[u8],
    body: &[u8],
    presented: &[u8],
) -> Result<(), VerificationError> {
    keyed_mac::<M>(key, body)?
        .verify_slice(presented)
        .map_err(|_| VerificationError::Mismatch("signature"))
}

/// Computes the HMAC of `body` under `key`.
///
/// # Errors
///
/// Returns [`VerificationError::InvalidKey`] if the MAC rejects the key
/// (HMAC accepts any length, so this does not happen in practice).
pub fn sign(
    algorithm: HmacAlgorithm,
    key: &[u8],
    body: &[u8],
) -> Result<Vec<u8>, VerificationError> {
    match algorithm {
        HmacAlgorithm::Sha1 => keyed_digest::<Hmac<Sha1>>(key, body),
        HmacAlgorithm::Sha256 => keyed_digest::<Hmac<Sha256>>(key, body),
        HmacAlgorithm::Sha512 => keyed_digest::<Hmac<Sha512>>(key, body),
    }
}

/// Computes the lowercase hex HMAC of `body` under `key`.
///
/// # Errors
///
/// See [`sign`].
pub fn sign_hex(
    algorithm: HmacAlgorithm,
    key: &[u8],
    body: &[u8],
) -> Result<String, VerificationError> {
    sign(algorithm, key, body).map(hex::encode)
}

/// Checks raw digest bytes against the HMAC of `body` under `key`.
///
/// # Errors
///
/// Returns [`VerificationError::Mismatch`] when the digests differ.
pub fn verify(
    algorithm: HmacAlgorithm,
    key: &[u8],
    body: &[u8],
    presented: &[u8],
) -> Result<(), VerificationError> {
    match algorithm {
        HmacAlgorithm::Sha1 => check_digest::<Hmac<Sha1>>(key, body, presented),
        HmacAlgorithm::Sha256 => check_digest::<Hmac<Sha256>>(key, body, presented),
        HmacAlgorithm::Sha512 => check_digest::<Hmac<Sha512>>(key, body, presented),
    }
}

/// Checks a bare hex HMAC against the raw body.
///
/// The comparison is on the hex text and therefore case-sensitive.
///
/// # Errors
///
/// Returns [`VerificationError::Mismatch`] when the digests differ.
pub fn verify_hex_digest(
    algorithm: HmacAlgorithm,
    secret: &Secret,
    body: &[u8],
    presented: &str,
) -> Result<(), VerificationError> {
    let expected = sign_hex(algorithm, secret.as_bytes(), body)?;
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(VerificationError::Mismatch("signature"))
    }
}

/// Checks an `<algo>=<hex>` signature value against the raw body.
///
/// # Errors
///
/// - [`VerificationError::MalformedHeader`] for a value without `=`, an
///   unsupported algorithm, or invalid hex.
/// - [`VerificationError::Mismatch`] when the digests differ.
pub fn verify_prefixed_signature(
    header: &'static str,
    value: &str,
    secret: &Secret,
    body: &[u8],
) -> Result<(), VerificationError> {
    let (prefix, hex_sig) = value
        .split_once('=')
        .ok_or_else(|| VerificationError::MalformedHeader {
            header,
            message: "expected <algorithm>=<hex digest>".to_string(),
        })?;
    let algorithm =
        HmacAlgorithm::from_prefix(prefix).ok_or_else(|| VerificationError::MalformedHeader {
            header,
            message: format!("unsupported algorithm '{prefix}'"),
        })?;
    let presented = hex::decode(hex_sig).map_err(|e| VerificationError::MalformedHeader {
        header,
        message: format!("invalid hex digest: {e}"),
    })?;

    verify(algorithm, secret.as_bytes(), body, &presented)?;
    debug!(algorithm = algorithm.prefix(), "Webhook signature validated");
    Ok(())
}

/// Checks the GitHub-style signature header on `request`.
///
/// `X-Hub-Signature-256` is preferred; `X-Hub-Signature` is accepted when it
/// is the only one present.
///
/// # Errors
///
/// Returns [`VerificationError::MissingHeader`] when neither header is
/// present, otherwise see [`verify_prefixed_signature`].
pub fn verify_hub_signature(
    request: &WebhookRequest,
    secret: &Secret,
) -> Result<(), VerificationError> {
    if let Some(value) = request.header(HUB_SIGNATURE_256) {
        return verify_prefixed_signature(HUB_SIGNATURE_256, value, secret, request.body());
    }
    match request.header(HUB_SIGNATURE) {
        Some(value) => verify_prefixed_signature(HUB_SIGNATURE, value, secret, request.body()),
        None => Err(VerificationError::MissingHeader(HUB_SIGNATURE)),
    }
}

// ---------------------------------------------------------------------------
// Shared secret
// ---------------------------------------------------------------------------

/// Checks that header `name` carries exactly the shared secret.
///
/// # Errors
///
/// Returns [`VerificationError::MissingHeader`] or
/// [`VerificationError::Mismatch`].
pub fn verify_shared_secret(
    request: &WebhookRequest,
    name: &'static str,
    secret: &Secret,
) -> Result<(), VerificationError> {
    let presented = request
        .header_bytes(name)
        .ok_or(VerificationError::MissingHeader(name))?;
    if bool::from(presented.ct_eq(secret.as_bytes())) {
        Ok(())
    } else {
        Err(VerificationError::Mismatch(name))
    }
}

// ---------------------------------------------------------------------------
// Bearer token audience
// ---------------------------------------------------------------------------

/// Resolves the audience of an identity token.
///
/// The production implementation is [`GoogleTokenInfo`]; tests substitute
/// their own.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the `aud` claim of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Introspection`] when the token cannot be
    /// introspected (network failure, non-2xx, undecodable response).
    async fn audience(&self, token: &str) -> Result<String, VerificationError>;
}

/// Default Google token introspection endpoint.
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// [`TokenVerifier`] backed by Google's `tokeninfo` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
}

impl GoogleTokenInfo {
    /// Creates a verifier against the public Google endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, GOOGLE_TOKENINFO_URL)
    }

    /// Creates a verifier against an alternative endpoint (used in tests).
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for GoogleTokenInfo {
    async fn audience(&self, token: &str) -> Result<String, VerificationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| VerificationError::Introspection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerificationError::Introspection(format!(
                "tokeninfo returned {status}"
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| {
                VerificationError::Introspection(format!("cannot decode tokeninfo: {e}"))
            })?;
        Ok(info.aud)
    }
}

/// Checks that the bearer token in `Authorization` was issued for `audience`.
///
/// # Errors
///
/// - [`VerificationError::MissingHeader`] / [`VerificationError::MalformedHeader`]
///   when there is no `Bearer` token.
/// - [`VerificationError::Introspection`] when the verifier fails.
/// - [`VerificationError::WrongAudience`] when the audiences differ.
pub async fn verify_bearer_audience(
    verifier: &dyn TokenVerifier,
    request: &WebhookRequest,
    audience: &str,
) -> Result<(), VerificationError> {
    const AUTHORIZATION: &str = "Authorization";

    let value = request
        .header(AUTHORIZATION)
        .ok_or(VerificationError::MissingHeader(AUTHORIZATION))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| VerificationError::MalformedHeader {
            header: AUTHORIZATION,
            message: "expected a Bearer token".to_string(),
        })?;

    let actual = verifier.audience(token).await?;
    if actual == audience {
        Ok(())
    } else {
        Err(VerificationError::WrongAudience { actual })
    }
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;
