//! Downstream change-notification client for hookrelay.
//!
//! Implements the [`changes::ChangeNotifier`] port over HTTP: each change is
//! POSTed as JSON to `<api>/v11/notify`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport and wire encoding live here. The listener
//! sees only [`changes::ChangeNotifier`].
//!
//! ## Cancellation
//!
//! There is no client-side timeout. The listener bounds every call by the
//! request deadline and drops the future when it expires, which aborts the
//! in-flight request.

use async_trait::async_trait;
use changes::{Change, ChangeNotifier, NotifyError};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Base URL used when the configuration names none.
pub const DEFAULT_API_BASE: &str = "http://localhost:3030/api/flux";

/// Path of the notify call, relative to the API base.
const NOTIFY_PATH: &str = "v11/notify";

/// Longest downstream response body kept in a [`NotifyError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

/// The configured API base is not a usable URL.
#[derive(Debug, Error)]
#[error("invalid downstream API URL '{url}': {source}")]
pub struct InvalidApiUrl {
    /// The offending value.
    pub url: String,
    /// Parser error.
    #[source]
    pub source: url::ParseError,
}

/// [`ChangeNotifier`] that POSTs changes to the downstream API.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    notify_url: Url,
}

impl HttpNotifier {
    /// Creates a notifier for the API rooted at `api_base`.
    ///
    /// A trailing `/` on `api_base` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidApiUrl`] if `api_base` is not an absolute URL.
    pub fn new(client: reqwest::Client, api_base: &str) -> Result<Self, InvalidApiUrl> {
        let invalid = |source| InvalidApiUrl {
            url: api_base.to_string(),
            source,
        };
        let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/'))).map_err(invalid)?;
        let notify_url = base.join(NOTIFY_PATH).map_err(invalid)?;
        Ok(Self { client, notify_url })
    }

    /// Returns the URL changes are POSTed to.
    pub fn notify_url(&self) -> &Url {
        &self.notify_url
    }
}

#[async_trait]
impl ChangeNotifier for HttpNotifier {
    #[instrument(skip(self, change), fields(change = %change))]
    async fn notify_change(&self, change: &Change) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(change).map_err(|e| NotifyError::Encoding {
            message: e.to_string(),
        })?;

        let response = self
            .client
            .post(self.notify_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Downstream accepted change");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
