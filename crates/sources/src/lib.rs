//! Webhook source adapters for hookrelay.
//!
//! Each supported provider delivers webhooks in its own format and proves
//! authenticity (or not) in its own way. This crate turns one inbound
//! [`WebhookRequest`] into a [`Verdict`]: the [`changes::Change`] values to
//! forward, or a benign acknowledgement.
//!
//! ## Architectural Layer
//!
//! **Domain adapters.** No HTTP server, no downstream client. The only I/O is
//! the bearer-token introspection behind [`TokenVerifier`], injected so the
//! listener and tests can choose the implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`endpoint`] | `SourceKind`, `Secret`, `Fingerprint`, `Endpoint` |
//! | [`request`] | `WebhookRequest` |
//! | [`verification`] | HMAC, shared-secret and bearer-audience checks |
//! | [`source`] | The bound `Source` enum, `Verdict`, `DeliveryPolicy` |
//! | [`errors`] | `SourceError`, `VerificationError` |
//!
//! Provider parsing lives in private per-provider modules reached through
//! [`Source::receive`].

pub mod endpoint;
pub mod errors;
mod providers;
pub mod request;
pub mod source;
pub mod verification;

pub use endpoint::{Endpoint, Fingerprint, Secret, SourceKind, UnknownSource};
pub use errors::{SourceError, VerificationError};
pub use request::WebhookRequest;
pub use source::{DeliveryPolicy, FanOut, OnFailure, Source, Verdict};
pub use verification::{GoogleTokenInfo, TokenVerifier};
