//! Error classification for session failures
//!
//! Maps raw failure conditions into a stable, severity-tagged taxonomy.
//! Cancellation has no `Failure` variant: an aborted request is an outcome,
//! not an error, and never reaches [`classify`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Fallback message when an error body cannot be decoded
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate feedback";

const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt before submitting.";
const NETWORK_MESSAGE: &str = "Unable to reach the server.";
const MALFORMED_PAYLOAD_MESSAGE: &str = "The response could not be decoded";

/// Taxonomy key of a classified error
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    /// Rejected locally before any network interaction
    Validation,
    /// No response obtained
    Network,
    /// Response obtained with a non-success status
    Api,
    /// Backend-supplied code outside the local taxonomy
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Validation => "validation_error",
            Self::Network => "network_error",
            Self::Api => "api_error",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "validation_error" => Self::Validation,
            "network_error" => Self::Network,
            "api_error" => Self::Api,
            _ => Self::Other(code),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory severity, drives display styling only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
}

impl Severity {
    /// Parse a wire value; unknown values yield `None`
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw failure condition observed by the session controller
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Prompt was empty after trimming
    EmptyPrompt,
    /// Transport produced no response
    Network { cause: String },
    /// Non-success status; `body` is the raw response text
    Api { status: u16, body: String },
    /// Success status whose body was not valid JSON
    MalformedPayload { status: u16, cause: String },
}

/// Typed, severity-tagged error record for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    /// Opaque structured context, may be an empty object
    pub details: Value,
}

/// Presentation hint derived from a classified error
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDisplay {
    pub title: &'static str,
    pub message: String,
    pub severity: Severity,
    pub advice: Option<&'static str>,
}

impl ClassifiedError {
    /// Derive the presentation hint for this error
    pub fn display(&self) -> ErrorDisplay {
        let (title, advice) = match self.code {
            ErrorCode::Validation => ("Invalid input", None),
            ErrorCode::Network => (
                "Connection problem",
                Some("Check your connection and try again."),
            ),
            ErrorCode::Api => (
                "Request failed",
                Some("The service may be busy. Try again in a moment."),
            ),
            ErrorCode::Other(_) => ("Something went wrong", None),
        };

        ErrorDisplay {
            title,
            message: self.message.clone(),
            severity: self.severity,
            advice,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    severity: Option<String>,
    details: Option<Value>,
}

/// Classify a failure. Pure and total.
pub fn classify(failure: &Failure) -> ClassifiedError {
    match failure {
        Failure::EmptyPrompt => ClassifiedError {
            code: ErrorCode::Validation,
            message: EMPTY_PROMPT_MESSAGE.to_string(),
            severity: Severity::Warning,
            details: Value::Object(Map::new()),
        },
        Failure::Network { cause } => ClassifiedError {
            code: ErrorCode::Network,
            message: NETWORK_MESSAGE.to_string(),
            severity: Severity::Error,
            details: json!({ "cause": cause }),
        },
        Failure::Api { status, body } => classify_api(*status, body),
        Failure::MalformedPayload { status, cause } => ClassifiedError {
            code: ErrorCode::Api,
            message: MALFORMED_PAYLOAD_MESSAGE.to_string(),
            severity: Severity::Error,
            details: json!({ "status": status, "cause": cause }),
        },
    }
}

fn classify_api(status: u16, body: &str) -> ClassifiedError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return ClassifiedError {
            code: ErrorCode::Api,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
            severity: Severity::Error,
            details: json!({ "status": status }),
        };
    };

    let ErrorBody {
        message,
        code,
        severity,
        details,
    } = envelope.error;

    ClassifiedError {
        code: code.map(ErrorCode::from).unwrap_or(ErrorCode::Api),
        message: message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        severity: severity
            .as_deref()
            .and_then(Severity::from_wire)
            .unwrap_or(Severity::Error),
        details: details.unwrap_or_else(|| json!({ "status": status })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, body: &str) -> Failure {
        Failure::Api {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_empty_prompt_is_validation_warning() {
        let err = classify(&Failure::EmptyPrompt);
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.details, json!({}));
    }

    #[test]
    fn test_network_failure() {
        let err = classify(&Failure::Network {
            cause: "connection refused".into(),
        });
        assert_eq!(err.code, ErrorCode::Network);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.details["cause"], "connection refused");
    }

    #[test]
    fn test_structured_error_body() {
        let err = classify(&api(
            503,
            r#"{"error":{"message":"overloaded","code":"api_error","severity":"error"}}"#,
        ));
        assert_eq!(err.code, ErrorCode::Api);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.message, "overloaded");
        assert_eq!(err.details, json!({ "status": 503 }));
    }

    #[test]
    fn test_body_code_and_severity_take_precedence() {
        let err = classify(&api(
            429,
            r#"{"error":{"message":"slow down","code":"rate_limited","severity":"warning","details":{"retryAfter":30}}}"#,
        ));
        assert_eq!(err.code, ErrorCode::Other("rate_limited".into()));
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.details, json!({ "retryAfter": 30 }));
    }

    #[test]
    fn test_body_without_code_defaults_to_api_error() {
        let err = classify(&api(500, r#"{"error":{"message":"boom"}}"#));
        assert_eq!(err.code, ErrorCode::Api);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_unknown_severity_falls_back_to_error() {
        let err = classify(&api(500, r#"{"error":{"message":"x","severity":"catastrophic"}}"#));
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn test_unparseable_body_uses_generic_message() {
        let err = classify(&api(502, "<html>Bad Gateway</html>"));
        assert_eq!(err.code, ErrorCode::Api);
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.details["status"], 502);
    }

    #[test]
    fn test_empty_body_uses_generic_message() {
        let err = classify(&api(500, ""));
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_json_without_error_object_is_unparseable() {
        let err = classify(&api(400, r#"{"message":"bad request"}"#));
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.code, ErrorCode::Api);
    }

    #[test]
    fn test_blank_message_uses_generic_message() {
        let err = classify(&api(500, r#"{"error":{"message":"  ","code":"api_error"}}"#));
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_malformed_success_payload() {
        let err = classify(&Failure::MalformedPayload {
            status: 200,
            cause: "expected value at line 1".into(),
        });
        assert_eq!(err.code, ErrorCode::Api);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.details["status"], 200);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let failures = vec![
            Failure::EmptyPrompt,
            Failure::Network { cause: "dns".into() },
            api(503, r#"{"error":{"message":"overloaded"}}"#),
            api(500, "not json"),
        ];
        for failure in &failures {
            assert_eq!(classify(failure), classify(failure));
        }
    }

    #[test]
    fn test_error_code_wire_format() {
        assert_eq!(ErrorCode::Validation.as_str(), "validation_error");
        assert_eq!(ErrorCode::Network.to_string(), "network_error");
        assert_eq!(
            serde_json::to_string(&ErrorCode::Api).unwrap(),
            "\"api_error\""
        );
        let code: ErrorCode = serde_json::from_str("\"quota_exceeded\"").unwrap();
        assert_eq!(code, ErrorCode::Other("quota_exceeded".into()));
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert_eq!(Severity::from_wire("info"), Some(Severity::Info));
        assert_eq!(Severity::from_wire("INFO"), None);
    }

    #[test]
    fn test_display_hint() {
        let display = classify(&Failure::Network { cause: "timeout".into() }).display();
        assert_eq!(display.title, "Connection problem");
        assert_eq!(display.severity, Severity::Error);
        assert!(display.advice.is_some());

        let display = classify(&Failure::EmptyPrompt).display();
        assert_eq!(display.title, "Invalid input");
        assert_eq!(display.severity, Severity::Warning);
        assert!(display.advice.is_none());
    }
}
