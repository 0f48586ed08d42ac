//! Scripted transport for tests
//!
//! Replies are served in order. A gated mock holds every reply until
//! `release` is called, which lets tests cancel or reset while a request is
//! in flight.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::{OutboundRequest, Transport, TransportError, TransportResponse};

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Deliver a response with this status and body
    Respond(TransportResponse),
    /// Fail without a response
    NetworkFailure(String),
}

impl MockReply {
    /// 200 with a JSON body
    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::Respond(TransportResponse::new(status, body.to_string()))
    }

    /// Any status with a raw text body
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self::Respond(TransportResponse::new(status, body))
    }
}

/// Transport that returns scripted replies and records every request
#[derive(Debug)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<OutboundRequest>>,
    gate: Option<Semaphore>,
    honor_cancellation: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
            honor_cancellation: true,
        }
    }

    /// Queue a reply (builder form)
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Hold replies until `release` is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Deliver replies even after the token fires, like a backend that
    /// finishes its work regardless of the abort signal
    pub fn ignoring_cancellation(mut self) -> Self {
        self.honor_cancellation = false;
        self
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Let `count` held requests proceed
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    async fn wait_for_gate(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
        let Some(gate) = &self.gate else {
            return Ok(());
        };

        let permit = if self.honor_cancellation {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                permit = gate.acquire() => permit,
            }
        } else {
            gate.acquire().await
        };

        permit
            .map(|p| p.forget())
            .map_err(|_| TransportError::Network("mock gate closed".into()))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: OutboundRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        self.wait_for_gate(&cancel).await?;

        if self.honor_cancellation && cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::NetworkFailure(cause)) => Err(TransportError::Network(cause)),
            None => Err(TransportError::Network("no scripted reply".into())),
        }
    }
}
