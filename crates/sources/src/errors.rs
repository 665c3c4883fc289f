//! Rejection types produced by source adapters and verification primitives.
//!
//! Every [`SourceError`] carries two texts: a short public `reply` that goes
//! back to the sender as the response body, and a `detail` that is only
//! logged. The sender never learns more than the reply.

use changes::ImageRefError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// An authenticity check did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// A header the scheme depends on was absent or not valid UTF-8.
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    /// The header was present but not in the expected shape.
    #[error("malformed {header} header: {message}")]
    MalformedHeader {
        /// Header name.
        header: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A signature or shared secret did not match.
    #[error("{0} does not match")]
    Mismatch(&'static str),

    /// The configured key was refused by the MAC implementation.
    #[error("key cannot be used for HMAC")]
    InvalidKey,

    /// The token introspection call failed or returned something unusable.
    #[error("token introspection failed: {0}")]
    Introspection(String),

    /// The token is valid but was minted for someone else.
    #[error("token audience '{actual}' is not the expected audience")]
    WrongAudience {
        /// The `aud` claim reported by the introspection endpoint.
        actual: String,
    },
}

// ---------------------------------------------------------------------------
// Adapter rejections
// ---------------------------------------------------------------------------

/// A webhook delivery was rejected by its source adapter.
///
/// The HTTP status for each variant is fixed by [`SourceError::status`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Authenticity check failed. Maps to 401.
    #[error("{reply}: {source}")]
    Unauthenticated {
        /// Public response body.
        reply: &'static str,
        /// Underlying verification failure.
        #[source]
        source: VerificationError,
    },

    /// The event-type header or field names an event this endpoint does not
    /// accept. Maps to 400.
    #[error("{reply}: {detail}")]
    UnexpectedEvent {
        /// Public response body.
        reply: &'static str,
        /// The offending value, for the log.
        detail: String,
    },

    /// The body could not be decoded or lacks a required field. Maps to 400.
    #[error("{reply}: {detail}")]
    MalformedPayload {
        /// Public response body.
        reply: &'static str,
        /// Decoder error or missing field, for the log.
        detail: String,
    },

    /// The payload names an image that is not a valid reference. Maps to 400.
    #[error("cannot parse image '{image}': {source}")]
    InvalidImage {
        /// The raw image string from the payload.
        image: String,
        /// Parser error.
        #[source]
        source: ImageRefError,
    },
}

impl SourceError {
    /// Builds an [`SourceError::Unauthenticated`].
    pub fn unauthenticated(reply: &'static str, source: VerificationError) -> Self {
        Self::Unauthenticated { reply, source }
    }

    /// Builds an [`SourceError::UnexpectedEvent`].
    pub fn unexpected_event(reply: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedEvent {
            reply,
            detail: detail.into(),
        }
    }

    /// Builds an [`SourceError::MalformedPayload`].
    pub fn malformed(reply: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::MalformedPayload {
            reply,
            detail: detail.to_string(),
        }
    }

    /// HTTP status code the sender should see for this rejection.
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::UnexpectedEvent { .. }
            | Self::MalformedPayload { .. }
            | Self::InvalidImage { .. } => 400,
        }
    }

    /// Short public response body.
    pub fn reply(&self) -> &'static str {
        match self {
            Self::Unauthenticated { reply, .. }
            | Self::UnexpectedEvent { reply, .. }
            | Self::MalformedPayload { reply, .. } => *reply,
            Self::InvalidImage { .. } => "Cannot parse image in webhook payload",
        }
    }
}
