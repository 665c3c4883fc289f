//! Normalised change model for hookrelay.
//!
//! Every webhook provider speaks its own wire format. Source adapters translate
//! those formats into the two events defined here, and the downstream notifier
//! forwards them. Nothing provider-specific crosses this boundary.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines the [`Change`] value and the [`ChangeNotifier`] port; the `notifier`
//! crate supplies the HTTP implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepoUrl`, `RefName`) |
//! | [`types`] | `Change`, `GitUpdate`, `ImageUpdate`, `ImageName`, `ImageRef` |
//! | [`errors`] | `ImageRefError`, `NotifyError` |
//! | [`notify`] | The `ChangeNotifier` port trait |

pub mod errors;
pub mod identifiers;
pub mod notify;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ImageRefError, NotifyError};
pub use identifiers::{RefName, RepoUrl};
pub use notify::ChangeNotifier;
pub use types::{Change, GitUpdate, ImageName, ImageRef, ImageUpdate};
