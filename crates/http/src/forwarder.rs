use hyper::ext::ReasonPhrase;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use skillrelay_core::{ForwardError, ForwardOutcome, ForwardRequest, Forwarder};
use tracing::{debug, info, instrument, warn};

use crate::config::HttpForwarderConfig;
use crate::error::HttpForwardError;

/// Forwards directives to the downstream endpoint over HTTP(S).
///
/// Issues exactly one `POST` per call. Redirects are not followed and failed
/// requests are never retried.
pub struct HttpForwarder {
    config: HttpForwarderConfig,
    client: Client,
}

impl HttpForwarder {
    /// Create a forwarder with a client built from the configuration.
    pub fn new(config: HttpForwarderConfig) -> Result<Self, HttpForwardError> {
        let mut builder = Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HttpForwardError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn classify(&self, err: reqwest::Error) -> HttpForwardError {
        match self.config.timeout {
            Some(timeout) if err.is_timeout() => {
                warn!("downstream request timed out");
                HttpForwardError::Timeout(timeout)
            }
            _ => HttpForwardError::Http(err),
        }
    }

    async fn post(&self, request: &ForwardRequest) -> Result<ForwardOutcome, HttpForwardError> {
        let url = self.config.url_for(&request.path);
        let body = serde_json::to_vec(&request.body)
            .map_err(|e| HttpForwardError::InvalidPayload(e.to_string()))?;

        debug!(url = %url, bytes = body.len(), "posting directive downstream");

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&request.token)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len().to_string());
        if let Some(user_agent) = &self.config.user_agent {
            builder = builder.header(USER_AGENT, user_agent.as_str());
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        info!(status = status.as_u16(), "downstream responded");

        if status != StatusCode::OK {
            let reason = reason_phrase(&response);
            warn!(status = status.as_u16(), reason = %reason, "downstream rejected directive");
            return Err(HttpForwardError::UnexpectedStatus {
                status: status.as_u16(),
                reason,
            });
        }

        if !request.read_body {
            return Ok(ForwardOutcome::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| HttpForwardError::InvalidBody(e.to_string()))?;
        Ok(ForwardOutcome::Body(body))
    }
}

/// Reason phrase from the status line. hyper only keeps it when it differs
/// from the canonical one, so fall back to that.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or_default()
        .to_owned()
}

impl Forwarder for HttpForwarder {
    #[instrument(skip(self, request), fields(path = %request.path, base_url = %self.config.base_url))]
    async fn forward(&self, request: &ForwardRequest) -> Result<ForwardOutcome, ForwardError> {
        self.post(request).await.map_err(ForwardError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use skillrelay_core::{ForwardError, ForwardOutcome, ForwardRequest, Forwarder};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    /// A minimal mock HTTP server built on tokio that returns canned responses.
    struct MockDownstream {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockDownstream {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        /// Accept one connection, read the full request, and answer with the
        /// given status line and body. Returns the raw request text.
        async fn respond_once(self, status: u16, reason: &str, body: &str) -> String {
            let (mut stream, _) = self.listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;

            let response = format!(
                "HTTP/1.1 {status} {reason}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            request
        }

        /// Accept one connection and never answer.
        async fn hang(self) {
            let (mut stream, _) = self.listener.accept().await.unwrap();
            let _request = read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    /// Read headers plus a `Content-Length` body from the stream.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn sample_request(read_body: bool) -> ForwardRequest {
        let event = json!({
            "directive": {
                "header": { "namespace": "Alexa.PowerController", "payloadVersion": "3" },
                "endpoint": { "scope": { "token": "tok-1" } }
            }
        });
        ForwardRequest::new("/hippoledlambda", "tok-1", event).with_read_body(read_body)
    }

    fn forwarder(base_url: &str) -> HttpForwarder {
        HttpForwarder::new(HttpForwarderConfig::new(base_url)).unwrap()
    }

    #[tokio::test]
    async fn posts_with_bearer_and_json_headers() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(200, "OK", "{}").await });

        let request = sample_request(false);
        let outcome = forwarder.forward(&request).await.unwrap();
        let raw = handle.await.unwrap();

        assert_eq!(outcome, ForwardOutcome::Status(200));
        assert!(raw.starts_with("POST /hippoledlambda HTTP/1.1"));
        let lower = raw.to_lowercase();
        assert!(lower.contains("authorization: bearer tok-1"));
        assert!(lower.contains("content-type: application/json"));

        let sent = serde_json::to_vec(&request.body).unwrap();
        assert!(lower.contains(&format!("content-length: {}", sent.len())));
        assert_eq!(request_body(&raw), request.body);
    }

    #[tokio::test]
    async fn content_length_counts_bytes_not_chars() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(200, "OK", "{}").await });

        let request = ForwardRequest::new("/p", "tok", json!({"name": "Küche"}));
        forwarder.forward(&request).await.unwrap();
        let raw = handle.await.unwrap();

        let sent = serde_json::to_vec(&request.body).unwrap();
        let chars = serde_json::to_string(&request.body).unwrap().chars().count();
        assert_ne!(sent.len(), chars);
        assert!(
            raw.to_lowercase()
                .contains(&format!("content-length: {}", sent.len()))
        );
    }

    #[tokio::test]
    async fn returns_parsed_body_when_requested() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle =
            tokio::spawn(async move { server.respond_once(200, "OK", r#"{"foo":"bar"}"#).await });

        let outcome = forwarder.forward(&sample_request(true)).await.unwrap();
        handle.await.unwrap();

        assert_eq!(outcome, ForwardOutcome::Body(json!({"foo": "bar"})));
    }

    #[tokio::test]
    async fn invalid_json_body_is_an_error_when_read() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle =
            tokio::spawn(async move { server.respond_once(200, "OK", "not json").await });

        let err = forwarder.forward(&sample_request(true)).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, ForwardError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn invalid_json_body_is_ignored_when_not_read() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle =
            tokio::spawn(async move { server.respond_once(200, "OK", "not json").await });

        let outcome = forwarder.forward(&sample_request(false)).await.unwrap();
        handle.await.unwrap();

        assert_eq!(outcome, ForwardOutcome::Status(200));
    }

    #[tokio::test]
    async fn server_error_maps_to_http_status() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_once(500, "Internal Server Error", r#"{"error":"boom"}"#)
                .await
        });

        let err = forwarder.forward(&sample_request(true)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(err.to_string(), "Http Error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn non_200_success_codes_are_failures() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(202, "Accepted", "{}").await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(
            err,
            ForwardError::HttpStatus {
                status: 202,
                reason: "Accepted".into()
            }
        );
    }

    #[tokio::test]
    async fn non_canonical_reason_phrase_is_reported() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle =
            tokio::spawn(async move { server.respond_once(503, "Back Soon", "{}").await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(err.to_string(), "Http Error: 503 Back Soon");
    }

    #[tokio::test]
    async fn unknown_status_keeps_wire_reason() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(599, "Weird", "{}").await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(
            err,
            ForwardError::HttpStatus {
                status: 599,
                reason: "Weird".into()
            }
        );
        assert_eq!(err.to_string(), "Http Error: 599 Weird");
    }

    #[tokio::test]
    async fn unknown_status_without_reason_has_no_trailing_space() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(599, "", "{}").await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(err.to_string(), "Http Error: 599");
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockDownstream::start().await;
        let forwarder = forwarder(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(302, "Found", "").await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(err.to_string(), "Http Error: 302 Found");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let forwarder = forwarder(&format!("http://127.0.0.1:{port}"));
        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();

        match err {
            ForwardError::Transport(message) => assert!(!message.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn configured_timeout_is_reported() {
        let server = MockDownstream::start().await;
        let config = HttpForwarderConfig::new(&server.base_url)
            .with_timeout(Duration::from_millis(200));
        let forwarder = HttpForwarder::new(config).unwrap();
        let handle = tokio::spawn(async move { server.hang().await });

        let err = forwarder.forward(&sample_request(false)).await.unwrap_err();
        handle.abort();

        assert_eq!(err, ForwardError::Timeout(Duration::from_millis(200)));
    }

    #[tokio::test]
    async fn sends_configured_user_agent() {
        let server = MockDownstream::start().await;
        let config = HttpForwarderConfig::new(&server.base_url).with_user_agent("skillrelay/1.0");
        let forwarder = HttpForwarder::new(config).unwrap();
        let handle = tokio::spawn(async move { server.respond_once(200, "OK", "{}").await });

        forwarder.forward(&sample_request(false)).await.unwrap();
        let raw = handle.await.unwrap();

        assert!(raw.to_lowercase().contains("user-agent: skillrelay/1.0"));
    }
}
