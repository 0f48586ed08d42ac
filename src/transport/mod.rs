//! Transport layer - the outbound call to the model backend
//!
//! This module provides:
//! - `Transport` trait for the one POST a session issues per submission
//! - `HttpTransport` implementation over reqwest
//! - `MockTransport` with scripted replies for tests

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

/// One outbound request: route plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub route: String,
    pub body: Value,
}

/// Raw response as received; decoding belongs to the session controller
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why no response was delivered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(String),
}

/// Issues a single JSON POST, racing it against a cancellation token.
///
/// Cancellation is best-effort: implementations should stop work when the
/// token fires, but callers never rely on it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: OutboundRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError>;
}
