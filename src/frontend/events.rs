//! Events and input commands for the front-end runner.
//!
//! This module provides:
//! - `Event`: the unified event type (input line, interrupt, completion)
//! - `Input`: one parsed input line

use crate::session::Completion;

/// Unified event type for the runner loop.
#[derive(Debug)]
pub enum Event {
    /// One line of input, `None` at end of input
    Line(Option<String>),
    /// Ctrl+C
    Interrupt,
    /// Transport completion for the session
    Completion(Option<Completion>),
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Prompt(String),
    Reset,
    Cancel,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    /// Lines starting with ':' are commands; everything else is a prompt.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Self::Prompt(line.to_string());
        };

        match command.trim() {
            "reset" | "r" => Self::Reset,
            "cancel" | "c" => Self::Cancel,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub const HELP_TEXT: &str = "\
Type a prompt and press Enter to submit it.
  :cancel   stop the request in flight
  :reset    clear the prompt and feedback
  :help     show this help
  :quit     exit (Ctrl+C also cancels, then exits)";
