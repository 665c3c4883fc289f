//! HTTP entry point for hookrelay.
//!
//! Inbound webhooks arrive at `POST /hook/<fingerprint>`. The
//! [`EndpointRegistry`] resolves the fingerprint to a bound
//! [`sources::Source`], and the [`Dispatcher`] runs that source, forwards the
//! resulting changes through a [`changes::ChangeNotifier`] under one shared
//! deadline, and maps the outcome to an HTTP status.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The registry is built once at startup and is read-only
//! afterwards; requests share nothing else.
//!
//! ## Status mapping
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Delivered, acknowledged, or best-effort failure | 200 |
//! | Malformed payload or unexpected event | 400 |
//! | Authenticity check failed | 401 (GCR: 200) |
//! | Unknown fingerprint, path or method | 404 |
//! | Deadline expired | 408 |
//! | Body over the size cap | 413 |
//! | Downstream failure | 500 |

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{Dispatcher, DEFAULT_DEADLINE};
pub use registry::EndpointRegistry;
