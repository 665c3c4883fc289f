//! The downstream notifier port.

use async_trait::async_trait;

use crate::{Change, NotifyError};

/// Hands a single [`Change`] to the downstream change-notification API.
///
/// Implementations must be cancel-safe: the dispatcher bounds every call by
/// the request deadline and drops the future when it expires or when the
/// inbound client goes away.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Delivers `change`, returning once the downstream API has accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on a transport failure or a non-2xx response.
    async fn notify_change(&self, change: &Change) -> Result<(), NotifyError>;
}
