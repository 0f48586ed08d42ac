//! Promptlab - interactive prompt engineering tools backed by an LLM service
//!
//! Each tool is a single request/response exchange: the user submits a
//! prompt, the session controller issues one cancellable call to the tool's
//! backend route, and the result (or a classified error) is rendered.

pub mod error;
pub mod frontend;
pub mod render;
pub mod session;
pub mod tools;
pub mod transport;

pub use error::{PromptlabError, Result};
