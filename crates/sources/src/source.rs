//! The closed set of bound source adapters.
//!
//! A [`Source`] is one provider adapter with its endpoint's key material and
//! options already attached. It is built once from an [`Endpoint`] by
//! [`Source::bind`] and is immutable afterwards, so a registry of sources can
//! be shared across request tasks without locks.
//!
//! ## Delivery policy
//!
//! How the changes from one delivery are sent downstream is a property of the
//! provider, not of the call site:
//!
//! | Provider | [`FanOut`] | [`OnFailure`] |
//! |----------|------------|---------------|
//! | GitHub, GitLab, Bitbucket Cloud | `Sequential` | `Report` |
//! | Bitbucket Server | `Concurrent` | `Report` |
//! | DockerHub, Quay, Harbor, Nexus, GCR | `Sequential` | `Ignore` |

use std::sync::Arc;

use changes::Change;

use crate::providers;
use crate::verification::TokenVerifier;
use crate::{Endpoint, Secret, SourceError, SourceKind, WebhookRequest};

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of an adapter accepting a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Forward these changes downstream. May be empty (e.g. a tag-only
    /// Bitbucket Server delivery), in which case nothing is sent.
    Forward(Vec<Change>),

    /// Nothing to forward; answer 200 with this body.
    Acknowledge(&'static str),
}

// ---------------------------------------------------------------------------
// Delivery policy
// ---------------------------------------------------------------------------

/// How multiple changes from one delivery are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// One after another in payload order; stop at the first failure.
    Sequential,
    /// All at once; the first failure is surfaced and the rest are dropped.
    Concurrent,
}

/// What a downstream failure means for the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Map the failure to 500 (or 408 past the deadline).
    Report,
    /// Log it and answer 200 anyway.
    Ignore,
}

/// Dispatch policy of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub fan_out: FanOut,
    pub on_failure: OnFailure,
}

impl DeliveryPolicy {
    const MUST_SUCCEED: Self = Self {
        fan_out: FanOut::Sequential,
        on_failure: OnFailure::Report,
    };
    const CONCURRENT: Self = Self {
        fan_out: FanOut::Concurrent,
        on_failure: OnFailure::Report,
    };
    const BEST_EFFORT: Self = Self {
        fan_out: FanOut::Sequential,
        on_failure: OnFailure::Ignore,
    };
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A provider adapter bound to one endpoint's configuration.
#[derive(Clone)]
pub enum Source {
    GitHub { secret: Secret },
    GitLab { secret: Secret },
    BitbucketCloud,
    BitbucketServer { secret: Secret },
    DockerHub,
    Quay,
    Harbor { secret: Secret },
    Nexus { secret: Secret, registry_host: Option<String> },
    GoogleContainerRegistry {
        audience: Option<String>,
        verifier: Arc<dyn TokenVerifier>,
    },
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nexus { registry_host, .. } => f
                .debug_struct("Nexus")
                .field("registry_host", registry_host)
                .finish_non_exhaustive(),
            Self::GoogleContainerRegistry { audience, .. } => f
                .debug_struct("GoogleContainerRegistry")
                .field("audience", audience)
                .finish_non_exhaustive(),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

impl Source {
    /// Binds the adapter named by `endpoint.kind` to the endpoint's options.
    ///
    /// `verifier` is only retained by Google Container Registry sources.
    pub fn bind(endpoint: Endpoint, verifier: Arc<dyn TokenVerifier>) -> Self {
        let Endpoint {
            kind,
            secret,
            registry_host,
            gcr_audience,
        } = endpoint;

        match kind {
            SourceKind::GitHub => Self::GitHub { secret },
            SourceKind::GitLab => Self::GitLab { secret },
            SourceKind::BitbucketCloud => Self::BitbucketCloud,
            SourceKind::BitbucketServer => Self::BitbucketServer { secret },
            SourceKind::DockerHub => Self::DockerHub,
            SourceKind::Quay => Self::Quay,
            SourceKind::Harbor => Self::Harbor { secret },
            SourceKind::Nexus => Self::Nexus {
                secret,
                registry_host,
            },
            SourceKind::GoogleContainerRegistry => Self::GoogleContainerRegistry {
                audience: gcr_audience,
                verifier,
            },
        }
    }

    /// Returns the provider of this source.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::GitHub { .. } => SourceKind::GitHub,
            Self::GitLab { .. } => SourceKind::GitLab,
            Self::BitbucketCloud => SourceKind::BitbucketCloud,
            Self::BitbucketServer { .. } => SourceKind::BitbucketServer,
            Self::DockerHub => SourceKind::DockerHub,
            Self::Quay => SourceKind::Quay,
            Self::Harbor { .. } => SourceKind::Harbor,
            Self::Nexus { .. } => SourceKind::Nexus,
            Self::GoogleContainerRegistry { .. } => SourceKind::GoogleContainerRegistry,
        }
    }

    /// Returns how this provider's changes are sent downstream.
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        match self {
            Self::GitHub { .. } | Self::GitLab { .. } | Self::BitbucketCloud => {
                DeliveryPolicy::MUST_SUCCEED
            }
            Self::BitbucketServer { .. } => DeliveryPolicy::CONCURRENT,
            Self::DockerHub
            | Self::Quay
            | Self::Harbor { .. }
            | Self::Nexus { .. }
            | Self::GoogleContainerRegistry { .. } => DeliveryPolicy::BEST_EFFORT,
        }
    }

    /// Body of the 500 answered when a reported downstream failure occurs.
    ///
    /// Providers that ignore failures never answer with it.
    pub fn failure_reply(&self) -> &'static str {
        match self {
            Self::GitLab { .. } => "Error forwarding hook",
            Self::BitbucketCloud | Self::BitbucketServer { .. } => {
                "Unable to process all push events"
            }
            _ => "Error while calling downstream API",
        }
    }

    /// Returns `true` if `error` should be answered with 200 rather than its
    /// own status.
    ///
    /// Google's push infrastructure retries anything but 2xx, and a rejected
    /// token or envelope will never get better, so GCR masks those. An
    /// unparseable image tag is still a 400.
    pub fn masks_rejection(&self, error: &SourceError) -> bool {
        matches!(self, Self::GoogleContainerRegistry { .. })
            && matches!(
                error,
                SourceError::Unauthenticated { .. } | SourceError::MalformedPayload { .. }
            )
    }

    /// Verifies and parses one delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] describing why the delivery was rejected.
    /// Nothing has been sent downstream when this fails.
    pub async fn receive(&self, request: &WebhookRequest) -> Result<Verdict, SourceError> {
        match self {
            Self::GitHub { secret } => providers::github::receive(secret, request),
            Self::GitLab { secret } => providers::gitlab::receive(secret, request),
            Self::BitbucketCloud => providers::bitbucket_cloud::receive(request),
            Self::BitbucketServer { secret } => {
                providers::bitbucket_server::receive(secret, request)
            }
            Self::DockerHub => providers::dockerhub::receive(request),
            Self::Quay => providers::quay::receive(request),
            Self::Harbor { secret } => providers::harbor::receive(secret, request),
            Self::Nexus {
                secret,
                registry_host,
            } => providers::nexus::receive(secret, registry_host.as_deref(), request),
            Self::GoogleContainerRegistry { audience, verifier } => {
                providers::gcr::receive(audience.as_deref(), verifier.as_ref(), request).await
            }
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
