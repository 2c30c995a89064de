use std::time::Duration;

use skillrelay_core::ForwardError;
use thiserror::Error;

/// Errors specific to the HTTP forwarder.
///
/// These are internal errors that get converted into [`ForwardError`] at the
/// [`Forwarder`](skillrelay_core::Forwarder) boundary.
#[derive(Debug, Error)]
pub enum HttpForwardError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The downstream endpoint answered with a status other than 200.
    #[error("unexpected status {status} {reason}")]
    UnexpectedStatus { status: u16, reason: String },

    /// A 200 response body was not valid JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// The request body could not be serialized.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The HTTP client could not be built from the configuration.
    #[error("client configuration error: {0}")]
    Client(String),
}

impl From<HttpForwardError> for ForwardError {
    fn from(err: HttpForwardError) -> Self {
        match err {
            HttpForwardError::Http(e) => ForwardError::Transport(error_chain(&e)),
            HttpForwardError::Timeout(after) => ForwardError::Timeout(after),
            HttpForwardError::UnexpectedStatus { status, reason } => {
                ForwardError::HttpStatus { status, reason }
            }
            HttpForwardError::InvalidBody(msg) => ForwardError::InvalidBody(msg),
            HttpForwardError::InvalidPayload(msg) => ForwardError::Serialization(msg),
            HttpForwardError::Client(msg) => ForwardError::Transport(msg),
        }
    }
}

/// Render an error together with its sources, outermost first.
///
/// `reqwest` keeps the interesting part (connection refused, DNS failure) in
/// the source chain rather than in its own `Display` output.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("connection refused")]
    struct Inner;

    #[test]
    fn error_chain_includes_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: connection refused");
        assert_eq!(error_chain(&Inner), "connection refused");
    }

    #[test]
    fn unexpected_status_maps_to_http_status() {
        let err: ForwardError = HttpForwardError::UnexpectedStatus {
            status: 503,
            reason: "Service Unavailable".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Http Error: 503 Service Unavailable");
    }

    #[test]
    fn timeout_keeps_duration() {
        let err: ForwardError = HttpForwardError::Timeout(Duration::from_secs(3)).into();
        assert_eq!(err, ForwardError::Timeout(Duration::from_secs(3)));
    }

    #[test]
    fn invalid_body_and_payload_map_through() {
        let err: ForwardError = HttpForwardError::InvalidBody("eof".into()).into();
        assert_eq!(err, ForwardError::InvalidBody("eof".into()));

        let err: ForwardError = HttpForwardError::InvalidPayload("nan".into()).into();
        assert_eq!(err, ForwardError::Serialization("nan".into()));
    }

    #[test]
    fn client_error_maps_to_transport() {
        let err: ForwardError = HttpForwardError::Client("bad tls".into()).into();
        assert!(matches!(err, ForwardError::Transport(_)));
    }

    #[test]
    fn error_display() {
        let err = HttpForwardError::UnexpectedStatus {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "unexpected status 404 Not Found");

        let err = HttpForwardError::InvalidPayload("bad json".into());
        assert_eq!(err.to_string(), "invalid payload: bad json");
    }
}
