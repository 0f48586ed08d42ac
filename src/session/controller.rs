//! Session controller: one request/response cycle per tool invocation.
//!
//! The controller owns the session state and the current cancellation token.
//! `submit` spawns exactly one outbound call; the call reports back through a
//! channel owned by the controller, and `apply` turns that completion into the
//! terminal transition. Completions whose token is no longer current are
//! discarded, so a cancelled or superseded request can never overwrite newer
//! state.
//!
//! All mutation goes through `&mut self`, which serialises "invalidate old
//! token" before "start new request" without a lock.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::tools::ToolDescriptor;
use crate::transport::{OutboundRequest, Transport, TransportError};

use super::classifier::{ClassifiedError, Failure, classify};
use super::state::{Phase, PhaseKind, SessionState, SessionToken, TokenId};

/// Result of a `submit` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Request issued under this token
    Started(TokenId),
    /// A request is already in flight; nothing was queued
    Ignored,
    /// Rejected locally before any network interaction; state untouched
    Rejected(ClassifiedError),
}

/// What the transport task observed
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    Succeeded(Value),
    Aborted,
    Failed(Failure),
}

/// Transport completion event, tagged with the token it was issued under
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    token: TokenId,
    outcome: ExchangeOutcome,
}

impl Completion {
    pub fn token(&self) -> TokenId {
        self.token
    }

    pub fn outcome(&self) -> &ExchangeOutcome {
        &self.outcome
    }
}

/// Result of applying a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The session moved to this resting phase
    Settled(PhaseKind),
    /// The completion belonged to an invalidated token and was dropped
    Stale,
}

impl Applied {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Drives one tool session against a transport
pub struct SessionController {
    descriptor: Arc<ToolDescriptor>,
    transport: Arc<dyn Transport>,
    state: SessionState,
    issued: u64,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    phase_tx: watch::Sender<PhaseKind>,
}

impl SessionController {
    pub fn new(descriptor: Arc<ToolDescriptor>, transport: Arc<dyn Transport>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (phase_tx, _) = watch::channel(PhaseKind::Idle);

        Self {
            descriptor,
            transport,
            state: SessionState::new(),
            issued: 0,
            completion_tx,
            completion_rx,
            phase_tx,
        }
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> PhaseKind {
        self.state.kind()
    }

    /// Observe phase changes
    pub fn subscribe(&self) -> watch::Receiver<PhaseKind> {
        self.phase_tx.subscribe()
    }

    /// Edit the draft prompt. Refused while a request is in flight.
    pub fn set_prompt(&mut self, text: impl Into<String>) -> bool {
        if self.state.is_submitting() {
            return false;
        }
        self.state.prompt_text = text.into();
        true
    }

    /// Submit a prompt.
    ///
    /// Spawns the outbound call on the current Tokio runtime, so this must be
    /// called from within one.
    pub fn submit(&mut self, prompt_text: impl Into<String>) -> SubmitOutcome {
        if self.state.is_submitting() {
            log::debug!("Submit ignored for '{}': request in flight", self.descriptor.id);
            return SubmitOutcome::Ignored;
        }

        let prompt_text = prompt_text.into();
        if prompt_text.trim().is_empty() {
            return SubmitOutcome::Rejected(classify(&Failure::EmptyPrompt));
        }

        let token = self.issue_token();
        let id = token.id();
        let request = OutboundRequest {
            route: self.descriptor.api_route.clone(),
            body: self.descriptor.request_body(&prompt_text),
        };

        tracing::info!(
            tool = %self.descriptor.id,
            token = %id,
            chars = prompt_text.chars().count(),
            "Submitting prompt"
        );

        let signal = token.signal();
        self.state.prompt_text = prompt_text;
        self.transition(Phase::Submitting(token));

        tokio::spawn(run_exchange(
            Arc::clone(&self.transport),
            request,
            signal,
            id,
            self.completion_tx.clone(),
        ));

        SubmitOutcome::Started(id)
    }

    /// Cancel the in-flight request and rest in `Aborted` immediately.
    /// Returns false (and does nothing) when not submitting.
    pub fn cancel(&mut self) -> bool {
        let Some(token) = self.state.token() else {
            return false;
        };

        token.cancel();
        tracing::info!(tool = %self.descriptor.id, token = %token.id(), "Request cancelled");
        self.transition(Phase::Aborted);
        true
    }

    /// Return to `Idle` from any phase, dropping any in-flight request
    pub fn reset(&mut self) {
        if let Some(token) = self.state.token() {
            token.cancel();
            log::debug!("Reset invalidated {} for '{}'", token.id(), self.descriptor.id);
        }
        self.state.prompt_text.clear();
        self.transition(Phase::Idle);
    }

    /// Wait for the next transport completion (current or stale)
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completion_rx.recv().await
    }

    /// Apply a completion if its token is still current
    pub fn apply(&mut self, completion: Completion) -> Applied {
        let is_current = self.state.token().is_some_and(|token| token.matches(completion.token));
        if !is_current {
            tracing::debug!(
                tool = %self.descriptor.id,
                token = %completion.token,
                "Discarding stale completion"
            );
            return Applied::Stale;
        }

        let next = match completion.outcome {
            ExchangeOutcome::Succeeded(payload) => Phase::Success(payload),
            ExchangeOutcome::Aborted => Phase::Aborted,
            ExchangeOutcome::Failed(failure) => {
                let error = classify(&failure);
                tracing::warn!(
                    tool = %self.descriptor.id,
                    token = %completion.token,
                    code = %error.code,
                    "Request failed: {}",
                    error.message
                );
                Phase::Error(error)
            }
        };

        let kind = next.kind();
        self.transition(next);
        Applied::Settled(kind)
    }

    /// Apply every completion already delivered, without waiting.
    /// Returns how many changed the phase.
    pub fn poll_completions(&mut self) -> usize {
        let mut settled = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion).is_settled() {
                settled += 1;
            }
        }
        settled
    }

    /// Wait until the session leaves `Submitting`, returning the resting phase
    pub async fn settle(&mut self) -> PhaseKind {
        while self.state.is_submitting() {
            let Some(completion) = self.completion_rx.recv().await else {
                break;
            };
            self.apply(completion);
        }
        self.phase()
    }

    fn issue_token(&mut self) -> SessionToken {
        self.issued += 1;
        SessionToken::new(TokenId::new(self.issued))
    }

    fn transition(&mut self, next: Phase) {
        let from = self.state.kind();
        let to = next.kind();
        self.state.phase = next;

        tracing::debug!(tool = %self.descriptor.id, from = %from, to = %to, "Session transition");
        self.phase_tx.send_replace(to);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(token) = self.state.token() {
            token.cancel();
        }
    }
}

/// The single outbound call for one submission
async fn run_exchange(
    transport: Arc<dyn Transport>,
    request: OutboundRequest,
    cancel: CancellationToken,
    token: TokenId,
    completion_tx: mpsc::UnboundedSender<Completion>,
) {
    let started = Instant::now();

    let outcome = match transport.send(request, cancel.clone()).await {
        Err(TransportError::Cancelled) => ExchangeOutcome::Aborted,
        // A body that raced the abort signal is discarded
        _ if cancel.is_cancelled() => ExchangeOutcome::Aborted,
        Err(TransportError::Network(cause)) => ExchangeOutcome::Failed(Failure::Network { cause }),
        Ok(response) if response.is_success() => {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(payload) => ExchangeOutcome::Succeeded(payload),
                Err(e) => ExchangeOutcome::Failed(Failure::MalformedPayload {
                    status: response.status,
                    cause: e.to_string(),
                }),
            }
        }
        Ok(response) => ExchangeOutcome::Failed(Failure::Api {
            status: response.status,
            body: response.body,
        }),
    };

    log::debug!("{} finished in {:?}", token, started.elapsed());

    // Receiver is gone only if the controller was dropped
    let _ = completion_tx.send(Completion { token, outcome });
}
