//! Generic outline view for any JSON payload
//!
//! Objects become headed sections, arrays become bullets, scalars are
//! printed as-is. Used for tools whose payload shape has no dedicated view.

use colored::*;
use serde_json::Value;

use super::{Renderer, heading};

const INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    title: String,
}

impl OutlineRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// "nextLessonSuggestion" -> "Next Lesson Suggestion"
fn label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut boundary = true;
    for c in key.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
            boundary = true;
            continue;
        }
        if c.is_uppercase() && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        if boundary {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = false;
    }
    out
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".dimmed().to_string(),
        other => other.to_string(),
    }
}

fn push_value(out: &mut Vec<String>, value: &Value, depth: usize) {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                match inner {
                    Value::Object(_) | Value::Array(_) => {
                        out.push(format!("{}{}", pad, heading(&label(key))));
                        push_value(out, inner, depth + 1);
                    }
                    _ => out.push(format!("{}{}: {}", pad, heading(&label(key)), scalar(inner))),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push(format!("{}•", pad));
                        push_value(out, item, depth + 1);
                    }
                    _ => out.push(format!("{}• {}", pad, scalar(item))),
                }
            }
        }
        _ => {
            for line in scalar(value).lines() {
                out.push(format!("{}{}", pad, line));
            }
        }
    }
}

impl Renderer for OutlineRenderer {
    fn render_result(&self, payload: &Value) -> String {
        let mut out = vec![heading(&self.title), String::new()];
        push_value(&mut out, payload, 0);
        out.join("\n")
    }
}
