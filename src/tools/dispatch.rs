//! Tool dispatch - descriptor to renderer
//!
//! A lookup table keyed by tool id. Ids without a renderer mount the
//! unsupported placeholder, so a descriptor can be registered before its
//! view exists.

use std::collections::HashMap;

use crate::render::{OutlineRenderer, Renderer, TutorRenderer, render_unsupported};
use crate::session::SessionState;

use super::ToolDescriptor;

/// What to mount for a tool
pub enum Mount<'a> {
    Renderer(&'a dyn Renderer),
    Unsupported,
}

impl Mount<'_> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Renderer(_))
    }

    /// Render a session through the mounted view
    pub fn render(&self, state: &SessionState) -> String {
        match self {
            Self::Renderer(renderer) => renderer.render(state),
            Self::Unsupported => render_unsupported(),
        }
    }
}

impl std::fmt::Debug for Mount<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Renderer(_) => f.write_str("Mount::Renderer"),
            Self::Unsupported => f.write_str("Mount::Unsupported"),
        }
    }
}

/// Renderer table keyed by tool id
pub struct ToolDispatcher {
    renderers: HashMap<String, Box<dyn Renderer>>,
}

impl ToolDispatcher {
    /// Empty table; every tool is unsupported
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Views for the built-in tools
    pub fn builtin() -> Self {
        Self::new()
            .with_renderer("prompt-tutor", TutorRenderer::new())
            .with_renderer(
                "basic-prompt-rewriter",
                OutlineRenderer::new("Basic Prompt Rewriter"),
            )
            .with_renderer("prompt-lessons", OutlineRenderer::new("Prompt Lessons"))
    }

    pub fn with_renderer(mut self, tool_id: &str, renderer: impl Renderer + 'static) -> Self {
        self.register(tool_id, Box::new(renderer));
        self
    }

    /// Register or replace the renderer for a tool id
    pub fn register(&mut self, tool_id: &str, renderer: Box<dyn Renderer>) {
        if self.renderers.insert(tool_id.to_string(), renderer).is_some() {
            log::debug!("Replaced renderer for '{}'", tool_id);
        }
    }

    pub fn renderer_for(&self, descriptor: &ToolDescriptor) -> Mount<'_> {
        match self.renderers.get(&descriptor.id) {
            Some(renderer) => Mount::Renderer(renderer.as_ref()),
            None => {
                log::debug!("No renderer for tool '{}'", descriptor.id);
                Mount::Unsupported
            }
        }
    }

    pub fn supports(&self, tool_id: &str) -> bool {
        self.renderers.contains_key(tool_id)
    }
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::builtin()
    }
}
