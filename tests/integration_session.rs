//! Session integration tests
//!
//! Resolve a tool, drive its session through a transport, and render the
//! outcome through the dispatched view.

use std::sync::Arc;
use std::time::Duration;

use promptlab::render::{ABORTED_TEXT, IDLE_TEXT};
use promptlab::session::{Applied, ErrorCode, PhaseKind, SessionController, Severity, SubmitOutcome};
use promptlab::tools::{ToolDispatcher, ToolRegistry};
use promptlab::transport::{HttpTransport, MockReply, MockTransport, Transport};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn tutor_payload() -> Value {
    json!({
        "analysis": { "strengths": ["clear"], "improvements": [] },
        "explanation": "...",
        "examples": { "before": "x", "after": "y" },
        "principles": ["p1"],
        "nextLessonSuggestion": "s"
    })
}

fn tutor_session(transport: Arc<dyn Transport>) -> SessionController {
    let registry = ToolRegistry::builtin();
    let descriptor = registry.resolve("prompt-tutor").expect("prompt-tutor is built in");
    SessionController::new(descriptor, transport)
}

/// Accept one connection, read until the request body arrives, answer with `response`
async fn serve_once(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let mut seen = Vec::new();
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&seen);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if seen.len() >= end + 4 + length {
                    break;
                }
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

fn http_transport(base_url: &str) -> Arc<dyn Transport> {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    Arc::new(HttpTransport::with_client(base_url, client))
}

#[test]
fn test_resolve_known_and_unknown_slugs() {
    let registry = ToolRegistry::builtin();

    assert!(registry.resolve("unknown-slug").is_none());
    let tutor = registry.resolve("prompt-tutor").unwrap();
    assert_eq!(tutor.slug, "prompt-tutor");
    assert_eq!(tutor.href(), "/ai/prompt-tutor");

    // Case-sensitive
    assert!(registry.resolve("Prompt-Tutor").is_none());
}

#[tokio::test]
async fn test_haiku_over_http_renders_feedback() {
    let base = serve_once(http_response("200 OK", &tutor_payload().to_string())).await;
    let mut session = tutor_session(http_transport(&base));

    assert!(matches!(session.submit("Write a haiku"), SubmitOutcome::Started(_)));
    assert_eq!(session.settle().await, PhaseKind::Success);
    assert_eq!(session.state().result(), Some(&tutor_payload()));

    let dispatcher = ToolDispatcher::builtin();
    let text = dispatcher.renderer_for(session.descriptor()).render(session.state());
    assert!(text.contains("Strengths"));
    assert!(text.contains("clear"));
    assert!(text.contains("p1"));
}

#[tokio::test]
async fn test_overloaded_backend_over_http() {
    let body = r#"{"error":{"message":"overloaded","code":"api_error","severity":"error"}}"#;
    let base = serve_once(http_response("503 Service Unavailable", body)).await;
    let mut session = tutor_session(http_transport(&base));

    session.submit("test");
    assert_eq!(session.settle().await, PhaseKind::Error);

    let error = session.state().error().unwrap();
    assert_eq!(error.code, ErrorCode::Api);
    assert_eq!(error.severity, Severity::Error);
    assert_eq!(error.message, "overloaded");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = tutor_session(http_transport(&format!("http://{}", addr)));
    session.submit("test");

    assert_eq!(session.settle().await, PhaseKind::Error);
    assert_eq!(session.state().error().unwrap().code, ErrorCode::Network);
}

#[tokio::test]
async fn test_cancel_then_late_success_is_discarded() {
    let mock = Arc::new(
        MockTransport::new()
            .gated()
            .ignoring_cancellation()
            .with_reply(MockReply::ok(&tutor_payload())),
    );
    let mut session = tutor_session(Arc::clone(&mock) as Arc<dyn Transport>);

    session.submit("test");
    assert!(session.cancel());
    assert_eq!(session.phase(), PhaseKind::Aborted);

    mock.release(1);
    let completion = tokio::time::timeout(Duration::from_secs(5), session.next_completion())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.apply(completion), Applied::Stale);
    assert_eq!(session.phase(), PhaseKind::Aborted);
    assert!(session.state().result().is_none());

    let dispatcher = ToolDispatcher::builtin();
    let text = dispatcher.renderer_for(session.descriptor()).render(session.state());
    assert!(text.contains(ABORTED_TEXT));
}

#[tokio::test]
async fn test_reset_then_resubmit_uses_fresh_token() {
    let mock = Arc::new(
        MockTransport::new()
            .gated()
            .ignoring_cancellation()
            .with_reply(MockReply::ok(&json!({"round": 1})))
            .with_reply(MockReply::ok(&json!({"round": 2}))),
    );
    let mut session = tutor_session(Arc::clone(&mock) as Arc<dyn Transport>);

    session.submit("first");
    tokio::time::sleep(Duration::from_millis(10)).await;
    session.reset();

    let dispatcher = ToolDispatcher::builtin();
    let text = dispatcher.renderer_for(session.descriptor()).render(session.state());
    assert!(text.contains(IDLE_TEXT));

    session.submit("second");
    tokio::time::sleep(Duration::from_millis(10)).await;
    mock.release(2);

    assert_eq!(session.settle().await, PhaseKind::Success);
    assert_eq!(session.state().result(), Some(&json!({"round": 2})));
    assert_eq!(session.state().prompt_text(), "second");
}

#[tokio::test]
async fn test_empty_prompt_never_reaches_transport() {
    let mock = Arc::new(MockTransport::new());
    let mut session = tutor_session(Arc::clone(&mock) as Arc<dyn Transport>);

    match session.submit("   ") {
        SubmitOutcome::Rejected(error) => assert_eq!(error.code, ErrorCode::Validation),
        other => panic!("expected rejection, got {:?}", other),
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(session.phase(), PhaseKind::Idle);
    assert_eq!(mock.call_count(), 0);
}
