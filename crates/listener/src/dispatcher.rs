//! The axum router and the per-request state machine behind it.
//!
//! ```text
//! Received ─┬─ NotFound (404)
//!           └─ Routed ─┬─ Rejected (400 / 401, or 200 when masked)
//!                      └─ Verified ─┬─ Acknowledged (200)
//!                                   └─ Dispatched ─┬─ Completed (200)
//!                                                  └─ Failed (500 / 408, or 200 when ignored)
//! ```
//!
//! One deadline is taken when the request is routed. Reading the body,
//! verifying the delivery and every downstream call of that delivery all run
//! against it.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use changes::{Change, ChangeNotifier, NotifyError};
use futures::future::try_join_all;
use futures::StreamExt;
use sources::{
    FanOut, Fingerprint, OnFailure, Source, SourceError, Verdict, VerificationError,
    WebhookRequest,
};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Deadline applied to each delivery when none is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Largest accepted webhook body. GitHub caps payloads at 25 MB.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

const OK: &str = "OK";

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes webhook deliveries to their sources and forwards the results.
///
/// Cheap to clone; all clones share the same registry and notifier.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    registry: crate::EndpointRegistry,
    notifier: Arc<dyn ChangeNotifier>,
    deadline: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher with the [`DEFAULT_DEADLINE`].
    pub fn new(registry: crate::EndpointRegistry, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self::with_deadline(registry, notifier, DEFAULT_DEADLINE)
    }

    /// Creates a dispatcher with a custom per-request deadline.
    pub fn with_deadline(
        registry: crate::EndpointRegistry,
        notifier: Arc<dyn ChangeNotifier>,
        deadline: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                notifier,
                deadline,
            }),
        }
    }

    /// Builds the HTTP routes served by hookrelay.
    ///
    /// - `POST /hook/{fingerprint}`: webhook deliveries.
    /// - `GET /health`: liveness, always `200 OK`.
    /// - anything else, including a known path with the wrong method: `404`.
    pub fn router(self) -> Router {
        Router::new()
            .route("/hook/{fingerprint}", post(receive_hook))
            .route("/health", get(health))
            .method_not_allowed_fallback(not_found)
            .fallback(not_found)
            .with_state(self)
    }

    async fn handle(&self, fingerprint: Fingerprint, request: Request) -> Response {
        let Some(source) = self.inner.registry.lookup(&fingerprint) else {
            debug!("No endpoint for fingerprint");
            return not_found().await;
        };
        Span::current().record("source", source.kind().as_str());

        let deadline = Instant::now() + self.inner.deadline;
        let (parts, body) = request.into_parts();
        let body = match timeout_at(deadline, read_body(body)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(BodyError::TooLarge)) => {
                warn!(limit = MAX_BODY_BYTES, "Request body exceeds size limit");
                return reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
            }
            Ok(Err(BodyError::Read(e))) => {
                warn!(error = %e, "Cannot read request body");
                return reply(StatusCode::BAD_REQUEST, "Cannot read payload");
            }
            Err(_) => {
                warn!("Deadline expired while reading request body");
                return reply(StatusCode::REQUEST_TIMEOUT, "Timed out reading request body");
            }
        };
        let webhook = WebhookRequest::new(parts.headers, body);

        let verdict = match timeout_at(deadline, source.receive(&webhook)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => return reject(source, &e),
            Err(_) => {
                let e = SourceError::unauthenticated(
                    "Timed out verifying request",
                    VerificationError::Introspection("deadline expired".to_string()),
                );
                return reject(source, &e);
            }
        };

        match verdict {
            Verdict::Acknowledge(body) => reply(StatusCode::OK, body),
            Verdict::Forward(changes) => self.forward(source, &changes, deadline).await,
        }
    }

    async fn forward(&self, source: &Source, changes: &[Change], deadline: Instant) -> Response {
        let policy = source.delivery_policy();
        let outcome = timeout_at(deadline, self.deliver(changes, policy.fan_out)).await;

        let failure = match outcome {
            Ok(Ok(())) => {
                info!(count = changes.len(), "Delivery forwarded");
                return reply(StatusCode::OK, OK);
            }
            Ok(Err(e)) if Instant::now() < deadline => Failure::Downstream(e),
            Ok(Err(_)) | Err(_) => Failure::Timeout,
        };

        match policy.on_failure {
            OnFailure::Ignore => {
                error!(error = %failure, "Downstream notification failed; acknowledging anyway");
                reply(StatusCode::OK, OK)
            }
            OnFailure::Report => {
                error!(error = %failure, "Downstream notification failed");
                match failure {
                    Failure::Timeout => reply(
                        StatusCode::REQUEST_TIMEOUT,
                        "Timed out waiting for response from downstream API",
                    ),
                    Failure::Downstream(_) => {
                        reply(StatusCode::INTERNAL_SERVER_ERROR, source.failure_reply())
                    }
                }
            }
        }
    }

    /// Sends `changes` downstream.
    ///
    /// Sequential delivery stops at the first failure. Concurrent delivery
    /// returns the first failure and drops the remaining calls.
    async fn deliver(&self, changes: &[Change], fan_out: FanOut) -> Result<(), NotifyError> {
        let notifier = self.inner.notifier.as_ref();
        match fan_out {
            FanOut::Sequential => {
                for (index, change) in changes.iter().enumerate() {
                    notifier.notify_change(change).await.inspect_err(|_| {
                        debug!(index, change = %change, "Stopping sequential delivery");
                    })?;
                }
                Ok(())
            }
            FanOut::Concurrent => try_join_all(changes.iter().map(|c| notifier.notify_change(c)))
                .await
                .map(|_| ()),
        }
    }
}

enum Failure {
    Downstream(NotifyError),
    Timeout,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Downstream(e) => write!(f, "{e}"),
            Self::Timeout => f.write_str("deadline expired before downstream responded"),
        }
    }
}

enum BodyError {
    TooLarge,
    Read(axum::Error),
}

/// Collects the request body, giving up as soon as it passes
/// [`MAX_BODY_BYTES`].
async fn read_body(body: Body) -> Result<Vec<u8>, BodyError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buffer.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(BodyError::TooLarge);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn receive_hook(
    State(dispatcher): State<Dispatcher>,
    Path(fingerprint): Path<String>,
    request: Request,
) -> Response {
    let span = info_span!("delivery", delivery = %Uuid::new_v4(), source = field::Empty);
    dispatcher
        .handle(Fingerprint::from_path_segment(fingerprint), request)
        .instrument(span)
        .await
}

async fn health() -> &'static str {
    OK
}

async fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, "Not Found")
}

fn reject(source: &Source, error: &SourceError) -> Response {
    warn!(source = %source.kind(), error = %error, "Rejected webhook delivery");
    if source.masks_rejection(error) {
        reply(StatusCode::OK, error.reply())
    } else {
        let status = StatusCode::from_u16(error.status()).unwrap_or(StatusCode::BAD_REQUEST);
        reply(status, error.reply())
    }
}

fn reply(status: StatusCode, body: &'static str) -> Response {
    (status, Body::from(body)).into_response()
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
