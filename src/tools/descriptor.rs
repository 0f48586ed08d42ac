//! Tool descriptors and model parameters
//!
//! A descriptor is the static configuration record for one tool: identity,
//! display metadata, backend route and the model parameters sent with each
//! request. Descriptors are built once at startup and shared immutably.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{PromptlabError, Result};

/// How the prompt is encoded in the outbound request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestFormat {
    /// Body is the prompt itself as a JSON string (conversational tools)
    #[default]
    RawPrompt,
    /// Body is an object carrying the prompt and the model parameters
    Structured,
}

/// Grouping shown in tool listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    #[default]
    Prompt,
    Writing,
    Code,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Writing => "writing",
            Self::Code => "code",
        }
    }
}

/// Valid temperature interval, supplied by the model backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self { min: 0.0, max: 2.0 }
    }
}

impl TemperatureRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Model parameters forwarded to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Opaque model identifier (e.g. "llama-3.1-8b-instant")
    pub model_id: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl ModelParameters {
    pub fn new(model_id: impl Into<String>, temperature: f64, max_output_tokens: u32) -> Self {
        Self {
            model_id: model_id.into(),
            temperature,
            max_output_tokens,
        }
    }
}

/// Static description of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Identity, unique across the registry
    pub id: String,
    /// URL key, unique, maps 1:1 to `id`
    pub slug: String,
    /// Human-readable tool name
    pub display_name: String,
    /// One-line description for listings
    #[serde(default)]
    pub description: String,
    /// Backend endpoint, one per tool
    pub api_route: String,
    /// Model parameters sent with each request
    pub model: ModelParameters,
    /// Backend re-attempts on schema-validation failures (not network failures)
    #[serde(default)]
    pub validation_retries: u32,
    #[serde(default)]
    pub request_format: RequestFormat,
    #[serde(default)]
    pub category: ToolCategory,
    /// Highlighted as new in listings
    #[serde(default)]
    pub is_new: bool,
}

impl ToolDescriptor {
    /// Create a descriptor with default metadata; `slug` doubles as `id`
    pub fn new(
        slug: impl Into<String>,
        display_name: impl Into<String>,
        api_route: impl Into<String>,
        model: ModelParameters,
    ) -> Self {
        let slug = slug.into();
        Self {
            id: slug.clone(),
            slug,
            display_name: display_name.into(),
            description: String::new(),
            api_route: api_route.into(),
            model,
            validation_retries: 0,
            request_format: RequestFormat::RawPrompt,
            category: ToolCategory::Prompt,
            is_new: false,
        }
    }

    /// Set an id distinct from the slug
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_validation_retries(mut self, retries: u32) -> Self {
        self.validation_retries = retries;
        self
    }

    pub fn with_request_format(mut self, format: RequestFormat) -> Self {
        self.request_format = format;
        self
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    /// Mark as new
    pub fn marked_new(mut self) -> Self {
        self.is_new = true;
        self
    }

    /// Navigation path for this tool
    pub fn href(&self) -> String {
        format!("/ai/{}", self.slug)
    }

    /// Build the outbound JSON body for a prompt
    pub fn request_body(&self, prompt: &str) -> Value {
        match self.request_format {
            RequestFormat::RawPrompt => Value::String(prompt.to_string()),
            RequestFormat::Structured => json!({
                "prompt": prompt,
                "model": {
                    "modelId": self.model.model_id,
                    "temperature": self.model.temperature,
                    "maxOutputTokens": self.model.max_output_tokens,
                },
                "validationRetries": self.validation_retries,
            }),
        }
    }

    /// Load-time checks on a single descriptor
    pub fn validate(&self, range: &TemperatureRange) -> Result<()> {
        let invalid = |reason: String| PromptlabError::InvalidTool {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".into()));
        }
        if self.slug.trim().is_empty() || self.slug.contains('/') {
            return Err(invalid(format!("slug '{}' is not a valid path segment", self.slug)));
        }
        if self.api_route.trim().is_empty() {
            return Err(invalid("api_route must not be empty".into()));
        }
        if self.model.max_output_tokens == 0 {
            return Err(invalid("max_output_tokens must be positive".into()));
        }
        if !range.contains(self.model.temperature) {
            return Err(invalid(format!(
                "temperature {} outside backend range [{}, {}]",
                self.model.temperature, range.min, range.max
            )));
        }
        Ok(())
    }
}
