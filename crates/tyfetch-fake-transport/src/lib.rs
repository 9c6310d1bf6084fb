//! Fake transport for tyfetch
//!
//! Used for testing code built on [`tyfetch::RequestExecutor`] without a
//! network. Outcomes are scripted up front and handed out in FIFO order,
//! and every request the executor sends is recorded for later inspection.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tyfetch::{ResolvedRequest, Transport, TransportError, TransportResponse};

/// One scripted outcome
#[derive(Debug, Clone)]
enum Outcome {
    Respond(TransportResponse),
    RespondAfter(Duration, TransportResponse),
    Fail(TransportError),
    Hang,
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Outcome>,
    requests: Vec<ResolvedRequest>,
}

/// Scripted in-memory [`Transport`]
///
/// Clones share the same script and request log, so a clone can be handed
/// to the executor while the test keeps the original.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    /// Empty transport. Calls fail until outcomes are scripted.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, outcome: Outcome) -> &Self {
        self.state().script.push_back(outcome);
        self
    }

    /// Reply with `status` and `body` serialized as JSON
    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.push(Outcome::Respond(TransportResponse::new(
            status,
            body.to_string(),
        )))
    }

    /// Reply with `status` and an empty body
    pub fn respond_status(&self, status: u16) -> &Self {
        self.push(Outcome::Respond(TransportResponse::new(status, Vec::new())))
    }

    /// Reply with a fully specified response
    pub fn respond_raw(&self, response: TransportResponse) -> &Self {
        self.push(Outcome::Respond(response))
    }

    /// Reply with `response` once `delay` has elapsed, unless cancelled first
    pub fn respond_after(&self, delay: Duration, response: TransportResponse) -> &Self {
        self.push(Outcome::RespondAfter(delay, response))
    }

    /// Fail with `error`
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Outcome::Fail(error))
    }

    /// Never answer. The call only ends when its token is cancelled.
    pub fn hang(&self) -> &Self {
        self.push(Outcome::Hang)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ResolvedRequest> {
        self.state().requests.clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<ResolvedRequest> {
        self.state().requests.last().cloned()
    }

    /// Number of scripted outcomes not yet consumed
    pub fn pending(&self) -> usize {
        self.state().script.len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let outcome = {
            let mut state = self.state();
            let outcome = state.script.pop_front();
            tracing::debug!("Fake transport received {} {}", request.method, request.url);
            match outcome {
                Some(outcome) => {
                    state.requests.push(request);
                    outcome
                }
                None => {
                    let message = format!(
                        "no scripted response for {} {}",
                        request.method, request.url
                    );
                    state.requests.push(request);
                    return Err(TransportError::Other(message));
                }
            }
        };

        match outcome {
            Outcome::Respond(response) => Ok(response),
            Outcome::Fail(error) => Err(error),
            Outcome::RespondAfter(delay, response) => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(TransportError::Cancelled(None)),
                    _ = time::sleep(delay) => Ok(response),
                }
            }
            Outcome::Hang => {
                cancel.cancelled().await;
                Err(TransportError::Cancelled(None))
            }
        }
    }
}
