//! Line-oriented front end for a tool session.
//!
//! Reads prompts and `:commands` from an async reader, renders the session
//! through the mounted view. The runner runs on the caller's Tokio runtime.

mod events;
mod runner;

pub use events::{Event, HELP_TEXT, Input};
pub use runner::FrontendRunner;
