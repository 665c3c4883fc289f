//! Endpoint descriptors and the route fingerprint derived from them.
//!
//! An [`Endpoint`] is built once at startup from configuration and never
//! mutated. Its [`Fingerprint`] is the unguessable path segment under which
//! the bound source is reachable (`/hook/<fingerprint>`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// The closed set of webhook providers hookrelay understands.
///
/// The configuration names (`"GitHub"`, `"DockerHub"`, …) are the
/// [`std::fmt::Display`] form and are accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    GitHub,
    GitLab,
    BitbucketCloud,
    BitbucketServer,
    DockerHub,
    Quay,
    Harbor,
    Nexus,
    GoogleContainerRegistry,
}

impl SourceKind {
    /// Every supported provider, in documentation order.
    pub const ALL: [SourceKind; 9] = [
        Self::GitHub,
        Self::GitLab,
        Self::BitbucketCloud,
        Self::BitbucketServer,
        Self::DockerHub,
        Self::Quay,
        Self::Harbor,
        Self::Nexus,
        Self::GoogleContainerRegistry,
    ];

    /// Returns the configuration name of this provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::GitLab => "GitLab",
            Self::BitbucketCloud => "BitbucketCloud",
            Self::BitbucketServer => "BitbucketServer",
            Self::DockerHub => "DockerHub",
            Self::Quay => "Quay",
            Self::Harbor => "Harbor",
            Self::Nexus => "Nexus",
            Self::GoogleContainerRegistry => "GoogleContainerRegistry",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration named a provider that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown source '{0}'; expected one of GitHub, GitLab, BitbucketCloud, BitbucketServer, DockerHub, Quay, Harbor, Nexus, GoogleContainerRegistry")]
pub struct UnknownSource(pub String);

impl FromStr for SourceKind {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// Key material for one endpoint, exactly as read from its key file.
///
/// The bytes are used verbatim: a trailing newline in the key file is part of
/// the secret. Excluded from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wraps raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Secret").field(&"<REDACTED>").finish()
    }
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 digest identifying an endpoint's route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digests `secret` followed by `registry_host` (when present).
    ///
    /// Endpoints with the same secret and registry host get the same
    /// fingerprint.
    pub fn derive(secret: &Secret, registry_host: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        if let Some(host) = registry_host {
            hasher.update(host.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps a fingerprint taken from a request path. No validation is done;
    /// an arbitrary string simply fails to match any endpoint.
    pub fn from_path_segment(segment: impl Into<String>) -> Self {
        Self(segment.into())
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// A configured binding of a provider to its key material and options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Which provider adapter handles this endpoint.
    pub kind: SourceKind,

    /// Shared secret or HMAC key. Providers without an authenticity scheme
    /// still need one: it seeds the fingerprint.
    pub secret: Secret,

    /// Registry host prepended to bare image names (Nexus payloads carry none).
    pub registry_host: Option<String>,

    /// Expected `aud` of the bearer token on Google Container Registry pushes.
    ///
    /// `None` disables token verification for the endpoint.
    pub gcr_audience: Option<String>,
}

impl Endpoint {
    /// Creates an endpoint with no provider-specific options.
    pub fn new(kind: SourceKind, secret: Secret) -> Self {
        Self {
            kind,
            secret,
            registry_host: None,
            gcr_audience: None,
        }
    }

    /// Sets the registry host.
    pub fn with_registry_host(mut self, host: impl Into<String>) -> Self {
        self.registry_host = Some(host.into());
        self
    }

    /// Sets the expected GCR token audience.
    pub fn with_gcr_audience(mut self, audience: impl Into<String>) -> Self {
        self.gcr_audience = Some(audience.into());
        self
    }

    /// Returns the route fingerprint of this endpoint.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::derive(&self.secret, self.registry_host.as_deref())
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
