//! The inbound webhook request as seen by a source adapter.

use bytes::Bytes;
use http::HeaderMap;

/// Headers and raw body of one webhook delivery.
///
/// The body is captured once, before any adapter runs, so HMAC-verifying
/// adapters can sign and parse the same bytes.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HeaderMap,
    body: Bytes,
}

impl WebhookRequest {
    /// Creates a request from already-read headers and body.
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Returns the value of header `name` if present and valid UTF-8.
    ///
    /// Header names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw header value bytes of `name`, if present.
    pub fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers.get(name).map(|v| v.as_bytes())
    }

    /// Returns the media type of the body without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header(http::header::CONTENT_TYPE.as_str())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns all headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
