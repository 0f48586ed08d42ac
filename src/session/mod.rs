//! Session system - one request/response cycle per tool invocation
//!
//! This module provides:
//! - `SessionController` state machine with cancellation and stale-result discarding
//! - `SessionState` and its tagged `Phase`
//! - `classify` for turning raw failures into display-ready errors

pub mod classifier;
pub mod controller;
pub mod state;

pub use classifier::{
    ClassifiedError, ErrorCode, ErrorDisplay, Failure, GENERIC_FAILURE_MESSAGE, Severity, classify,
};
pub use controller::{Applied, Completion, ExchangeOutcome, SessionController, SubmitOutcome};
pub use state::{Phase, PhaseKind, SessionState, SessionToken, TokenId};
