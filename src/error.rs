//! Error types for promptlab
//!
//! Centralized error handling using thiserror. Session failures never surface
//! here: they end in a classified `Error` phase instead.

use thiserror::Error;

/// All crate-level errors (registry loading, HTTP client setup, I/O)
#[derive(Debug, Error)]
pub enum PromptlabError {
    /// Two descriptors share a slug or an id
    #[error("Duplicate tool {field}: {value}")]
    DuplicateTool { field: &'static str, value: String },

    /// A descriptor failed load-time validation
    #[error("Invalid tool '{id}': {reason}")]
    InvalidTool { id: String, reason: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for promptlab operations
pub type Result<T> = std::result::Result<T, PromptlabError>;
