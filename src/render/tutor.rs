//! Prompt tutor feedback view

use serde::Deserialize;
use serde_json::Value;

use super::{OutlineRenderer, Renderer, heading, push_bullets};

const FEEDBACK_PLACEHOLDER: &str = "Detailed feedback will appear here.";
const BEFORE_PLACEHOLDER: &str = "Example prompt will appear here.";
const AFTER_PLACEHOLDER: &str = "Improved version will appear here.";
const NEXT_STEPS_PLACEHOLDER: &str = "Recommendations will appear here.";

/// Tutor payload; every field is optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TutorFeedback {
    pub analysis: Analysis,
    pub explanation: Option<String>,
    pub examples: Examples,
    pub principles: Vec<String>,
    pub next_lesson_suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Examples {
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Empty strings count as missing
fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(placeholder)
}

#[derive(Debug, Default)]
pub struct TutorRenderer;

impl TutorRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_feedback(&self, feedback: &TutorFeedback) -> String {
        let mut out = vec![heading("Prompt Analysis"), String::new()];

        out.push(heading("Strengths"));
        push_bullets(&mut out, &feedback.analysis.strengths);
        out.push(heading("Areas to Improve"));
        push_bullets(&mut out, &feedback.analysis.improvements);
        out.push(String::new());

        out.push(heading("Detailed Feedback"));
        out.push(format!(
            "  {}",
            or_placeholder(&feedback.explanation, FEEDBACK_PLACEHOLDER)
        ));
        out.push(String::new());

        out.push(heading("Example Improvements"));
        out.push("  Original".to_string());
        for line in or_placeholder(&feedback.examples.before, BEFORE_PLACEHOLDER).lines() {
            out.push(format!("    {}", line));
        }
        out.push("  Improved Version".to_string());
        for line in or_placeholder(&feedback.examples.after, AFTER_PLACEHOLDER).lines() {
            out.push(format!("    {}", line));
        }
        out.push(String::new());

        out.push(heading("Key Principles"));
        push_bullets(&mut out, &feedback.principles);
        out.push(String::new());

        out.push(heading("Next Steps"));
        out.push(format!(
            "  {}",
            or_placeholder(&feedback.next_lesson_suggestion, NEXT_STEPS_PLACEHOLDER)
        ));

        out.join("\n")
    }
}

impl Renderer for TutorRenderer {
    fn render_result(&self, payload: &Value) -> String {
        match TutorFeedback::deserialize(payload) {
            Ok(feedback) => self.render_feedback(&feedback),
            Err(e) => {
                log::warn!("Tutor payload did not match the feedback shape: {}", e);
                OutlineRenderer::new("Prompt Tutor").render_result(payload)
            }
        }
    }
}
