//! HTTP transport over reqwest
//!
//! POSTs the request body as JSON to `base_url + route` and returns the raw
//! status and body text. The whole exchange (send and body read) is raced
//! against the cancellation token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use crate::error::{PromptlabError, Result};

use super::{OutboundRequest, Transport, TransportError, TransportResponse};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with its own client and the given timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PromptlabError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a transport around an existing client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a route against the base URL; absolute URLs pass through
    pub fn url_for(&self, route: &str) -> String {
        if route.starts_with("http://") || route.starts_with("https://") {
            return route.to_string();
        }
        if route.starts_with('/') {
            format!("{}{}", self.base_url, route)
        } else {
            format!("{}/{}", self.base_url, route)
        }
    }

    async fn exchange(
        &self,
        request: &OutboundRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.url_for(&request.route);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?;

        log::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: OutboundRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<TransportResponse, TransportError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("POST {} cancelled", request.route);
                Err(TransportError::Cancelled)
            }
            result = self.exchange(&request) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn test_transport(base_url: &str) -> HttpTransport {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpTransport::with_client(base_url, client)
    }

    /// Read one HTTP request (headers plus Content-Length body)
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serve a single canned response, returning the base URL and the captured request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_url_for_joins_routes() {
        let transport = test_transport("http://localhost:3000/");
        assert_eq!(transport.base_url(), "http://localhost:3000");
        assert_eq!(
            transport.url_for("/api/ai/prompt-tutor"),
            "http://localhost:3000/api/ai/prompt-tutor"
        );
        assert_eq!(
            transport.url_for("api/ai/prompt-tutor"),
            "http://localhost:3000/api/ai/prompt-tutor"
        );
        assert_eq!(
            transport.url_for("https://other.example/api"),
            "https://other.example/api"
        );
    }

    #[tokio::test]
    async fn test_success_response() {
        let (base, server) = serve_once("200 OK", r#"{"explanation":"ok"}"#).await;
        let transport = test_transport(&base);

        let request = OutboundRequest {
            route: "/api/ai/prompt-tutor".into(),
            body: json!("Write a haiku"),
        };
        let response = transport
            .send(request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"explanation":"ok"}"#);

        let captured = server.await.unwrap();
        assert!(captured.starts_with("POST /api/ai/prompt-tutor HTTP/1.1"));
        assert!(captured.to_lowercase().contains("content-type: application/json"));
        assert!(captured.ends_with("\"Write a haiku\""));
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let body = r#"{"error":{"message":"overloaded","code":"api_error","severity":"error"}}"#;
        let (base, server) = serve_once("503 Service Unavailable", body).await;
        let transport = test_transport(&base);

        let request = OutboundRequest {
            route: "/api/ai/prompt-tutor".into(),
            body: json!("test"),
        };
        let response = transport
            .send(request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
        assert_eq!(response.body, body);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = test_transport(&format!("http://{}", addr));
        let request = OutboundRequest {
            route: "/api/ai/prompt-tutor".into(),
            body: json!("test"),
        };
        let result = transport.send(request, CancellationToken::new()).await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let _ = read_request(&mut socket).await;
            // Hold the connection open without answering
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let transport = test_transport(&format!("http://{}", addr));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let request = OutboundRequest {
            route: "/api/ai/prompt-tutor".into(),
            body: json!("test"),
        };
        let result = transport.send(request, cancel).await;

        assert_eq!(result, Err(TransportError::Cancelled));
        server.abort();
    }

    #[tokio::test]
    async fn test_already_cancelled_token_short_circuits() {
        let transport = test_transport("http://127.0.0.1:9");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = OutboundRequest {
            route: "/x".into(),
            body: json!("test"),
        };
        let result = transport.send(request, cancel).await;
        assert_eq!(result, Err(TransportError::Cancelled));
    }
}
