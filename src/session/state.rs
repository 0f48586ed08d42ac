//! Session state for one tool invocation.
//!
//! The phase is a tagged enum: the cancellation token only exists inside
//! `Submitting`, the result only inside `Success`, the error only inside
//! `Error`. Impossible combinations (loading with an error, a result next to
//! an error) cannot be constructed.

use std::fmt;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::classifier::ClassifiedError;

/// Identity of one submission's token, unique per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

impl TokenId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Cancellation handle owned by the controller for one in-flight submission
#[derive(Debug, Clone)]
pub struct SessionToken {
    id: TokenId,
    cancel: CancellationToken,
}

impl SessionToken {
    pub(crate) fn new(id: TokenId) -> Self {
        Self {
            id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Returns true if this token identifies the given submission
    pub fn matches(&self, id: TokenId) -> bool {
        self.id == id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle passed to the transport task
    pub(crate) fn signal(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Lifecycle phase with its associated data
#[derive(Debug, Clone, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting(SessionToken),
    Success(Value),
    Aborted,
    Error(ClassifiedError),
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::Submitting(_) => PhaseKind::Submitting,
            Self::Success(_) => PhaseKind::Success,
            Self::Aborted => PhaseKind::Aborted,
            Self::Error(_) => PhaseKind::Error,
        }
    }
}

/// Data-free phase discriminant, used for observation and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    Submitting,
    Success,
    Aborted,
    Error,
}

impl PhaseKind {
    /// Only `Submitting` has an in-flight side effect
    pub fn is_resting(&self) -> bool {
        !matches!(self, Self::Submitting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Aborted => "aborted",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a session, owned and mutated by the controller only
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) prompt_text: String,
    pub(crate) phase: Phase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting(_))
    }

    /// Current token, present iff submitting
    pub fn token(&self) -> Option<&SessionToken> {
        match &self.phase {
            Phase::Submitting(token) => Some(token),
            _ => None,
        }
    }

    /// Decoded payload, present iff the last submission succeeded
    pub fn result(&self) -> Option<&Value> {
        match &self.phase {
            Phase::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Classified error, present iff the last submission failed
    pub fn error(&self) -> Option<&ClassifiedError> {
        match &self.phase {
            Phase::Error(error) => Some(error),
            _ => None,
        }
    }
}
