//! Tool registry: slug → descriptor lookup
//!
//! Built once at startup from the shipped tools plus any configured extras.
//! There is no mutation API; unknown slugs resolve to `None`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{PromptlabError, Result};

use super::descriptor::{ModelParameters, RequestFormat, TemperatureRange, ToolDescriptor};

/// The tools shipped with promptlab
pub fn builtin_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "basic-prompt-rewriter",
            "Basic Prompt Rewriter",
            "/api/ai/basic-prompt-rewriter",
            ModelParameters::new("llama-3.1-8b-instant", 0.3, 1000),
        )
        .with_description("Rewrite a rough prompt into a clearer, more specific one"),
        ToolDescriptor::new(
            "prompt-tutor",
            "Prompt Tutor",
            "/api/ai/prompt-tutor",
            ModelParameters::new("llama-3.1-8b-instant", 0.2, 1500),
        )
        .with_description("Submit a prompt and receive personalised feedback and lessons")
        .with_validation_retries(1),
        ToolDescriptor::new(
            "prompt-lessons",
            "Prompt Lessons",
            "/api/ai/prompt-lessons",
            ModelParameters::new("llama-3.1-8b-instant", 0.2, 1500),
        )
        .with_description("Learn prompt engineering through interactive, hands-on lessons")
        .with_validation_retries(1)
        .with_request_format(RequestFormat::Structured)
        .marked_new(),
    ]
}

/// Read-only lookup table of tool descriptors
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<ToolDescriptor>>,
    by_slug: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Registry of the shipped tools
    pub fn builtin() -> Self {
        Self::index(builtin_descriptors())
    }

    /// Build a registry, checking descriptor validity and slug/id uniqueness
    pub fn from_descriptors(
        descriptors: Vec<ToolDescriptor>,
        range: &TemperatureRange,
    ) -> Result<Self> {
        let mut slugs = HashSet::new();
        let mut ids = HashSet::new();

        for descriptor in &descriptors {
            descriptor.validate(range)?;
            if !slugs.insert(descriptor.slug.as_str()) {
                return Err(PromptlabError::DuplicateTool {
                    field: "slug",
                    value: descriptor.slug.clone(),
                });
            }
            if !ids.insert(descriptor.id.as_str()) {
                return Err(PromptlabError::DuplicateTool {
                    field: "id",
                    value: descriptor.id.clone(),
                });
            }
        }

        Ok(Self::index(descriptors))
    }

    /// Shipped tools followed by `extra`, checked together
    pub fn with_extra(extra: Vec<ToolDescriptor>, range: &TemperatureRange) -> Result<Self> {
        let mut descriptors = builtin_descriptors();
        descriptors.extend(extra);
        Self::from_descriptors(descriptors, range)
    }

    fn index(descriptors: Vec<ToolDescriptor>) -> Self {
        let tools: Vec<Arc<ToolDescriptor>> = descriptors.into_iter().map(Arc::new).collect();
        let by_slug = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.slug.clone(), i))
            .collect();
        let by_id = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        Self { tools, by_slug, by_id }
    }

    /// Exact, case-sensitive slug lookup
    pub fn resolve(&self, slug: &str) -> Option<Arc<ToolDescriptor>> {
        self.by_slug.get(slug).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// Lookup by tool identity
    pub fn get_by_id(&self, id: &str) -> Option<Arc<ToolDescriptor>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// All descriptors in registration order
    pub fn list(&self) -> &[Arc<ToolDescriptor>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
