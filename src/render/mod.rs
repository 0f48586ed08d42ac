//! Renderers - project session state to terminal text
//!
//! Every renderer shares the resting-phase texts and the error display; only
//! the success view is tool-specific.

pub mod outline;
pub mod tutor;

use colored::*;
use serde_json::Value;

use crate::session::{ErrorDisplay, Phase, SessionState, Severity};

pub use outline::OutlineRenderer;
pub use tutor::TutorRenderer;

pub const IDLE_TEXT: &str = "Submit a prompt to see feedback and analysis here.";
pub const SUBMITTING_TEXT: &str = "Analyzing your prompt...";
pub const ABORTED_TEXT: &str = "Generation was stopped. Submit a new prompt to continue.";
pub const UNSUPPORTED_TEXT: &str = "Tool type not supported yet";

/// Per-tool view over a session
pub trait Renderer: Send + Sync {
    /// Render a successful payload
    fn render_result(&self, payload: &Value) -> String;

    /// Render the whole session for its current phase
    fn render(&self, state: &SessionState) -> String {
        match state.phase() {
            Phase::Idle => IDLE_TEXT.dimmed().to_string(),
            Phase::Submitting(_) => SUBMITTING_TEXT.cyan().to_string(),
            Phase::Aborted => ABORTED_TEXT.yellow().to_string(),
            Phase::Error(error) => render_error(&error.display()),
            Phase::Success(payload) => self.render_result(payload),
        }
    }
}

/// "Title: message" tinted by severity, with advice on its own line
pub fn render_error(display: &ErrorDisplay) -> String {
    let headline = format!("{}: {}", display.title, display.message);
    let headline = match display.severity {
        Severity::Info => headline.as_str().cyan(),
        Severity::Warning => headline.as_str().yellow(),
        Severity::Error => headline.as_str().red(),
    };

    match display.advice {
        Some(advice) => format!("{}\n{}", headline, advice.dimmed()),
        None => headline.to_string(),
    }
}

/// Placeholder mounted for tools without a renderer
pub fn render_unsupported() -> String {
    UNSUPPORTED_TEXT.dimmed().to_string()
}

/// Bold section heading
pub(crate) fn heading(title: &str) -> String {
    title.bold().to_string()
}

/// Append an indented bullet list
pub(crate) fn push_bullets(out: &mut Vec<String>, items: &[String]) {
    for item in items {
        out.push(format!("  • {}", item));
    }
}
