//! Request builders shared by the provider tests.

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::verification::{sign_hex, HmacAlgorithm};
use crate::{Secret, WebhookRequest};

/// Fluent builder for a [`WebhookRequest`].
#[derive(Default)]
pub(crate) struct RequestBuilder {
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub(crate) fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::default()
            .header("Content-Type", "application/json")
            .body(body)
    }

    pub(crate) fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }

    pub(crate) fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds an `X-Hub-Signature-256` header computed over the current body.
    pub(crate) fn hub_signed(self, secret: &Secret) -> Self {
        let digest = sign_hex(HmacAlgorithm::Sha256, secret.as_bytes(), &self.body).unwrap();
        self.header("X-Hub-Signature-256", &format!("sha256={digest}"))
    }

    pub(crate) fn build(self) -> WebhookRequest {
        WebhookRequest::new(self.headers, self.body)
    }
}
