//! Error types for the change model and the notifier port.
//!
//! [`ImageRefError`] is produced while building an image change from an
//! untrusted payload string. [`NotifyError`] is produced by any
//! [`crate::ChangeNotifier`] implementation when a change could not be handed
//! to the downstream API.

use thiserror::Error;

/// An image string from a webhook payload is not a valid image reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRefError {
    /// The reference was the empty string.
    #[error("blank image name")]
    Blank,

    /// The reference has a structural problem (stray `/` or `:`, empty name).
    #[error("malformed image reference '{0}'")]
    Malformed(String),

    /// The reference ends in `:` with no tag after it.
    #[error("blank tag in image reference '{0}'")]
    BlankTag(String),
}

/// The downstream API did not accept a change.
///
/// Deadline expiry is not represented here: the caller enforces the deadline
/// by dropping the notify future, so the notifier never observes it.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never produced a response (connect failure, reset, TLS).
    #[error("downstream request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The downstream API answered with a non-success status.
    #[error("downstream API returned {status}: {body}")]
    Rejected {
        /// HTTP status code returned.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The change could not be serialised for the wire.
    #[error("cannot encode change: {message}")]
    Encoding {
        /// Serialiser error description.
        message: String,
    },
}
