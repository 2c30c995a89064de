use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ForwardError;

/// A single outbound call to the downstream endpoint.
#[derive(Clone, PartialEq)]
pub struct ForwardRequest {
    /// Path on the downstream host.
    pub path: String,
    /// Bearer token sent in the `Authorization` header.
    pub token: String,
    /// JSON body: `{"header": {"token": ..}, "payload": <inbound event>}`.
    pub body: Value,
    /// Whether the 200 response body must be parsed and returned.
    pub read_body: bool,
}

impl ForwardRequest {
    /// Wrap an inbound event in the downstream request body.
    pub fn new(path: impl Into<String>, token: impl Into<String>, event: Value) -> Self {
        let token = token.into();
        let body = json!({
            "header": { "token": token },
            "payload": event,
        });
        Self {
            path: path.into(),
            token,
            body,
            read_body: false,
        }
    }

    /// Request that the 200 response body be parsed and returned.
    #[must_use]
    pub fn with_read_body(mut self, read_body: bool) -> Self {
        self.read_body = read_body;
        self
    }
}

impl std::fmt::Debug for ForwardRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardRequest")
            .field("path", &self.path)
            .field("token", &"[REDACTED]")
            .field("read_body", &self.read_body)
            .finish_non_exhaustive()
    }
}

/// Successful result of a forward.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardOutcome {
    /// Parsed downstream body (requested with `read_body`).
    Body(Value),
    /// Status code only; the body was not read.
    Status(u16),
}

/// Strongly-typed forwarder trait with native `async fn`.
///
/// Not object-safe. Use [`DynForwarder`] for dynamic dispatch; every
/// `Forwarder` implements it through a blanket implementation.
pub trait Forwarder: Send + Sync {
    /// Issue exactly one request downstream.
    fn forward(
        &self,
        request: &ForwardRequest,
    ) -> impl std::future::Future<Output = Result<ForwardOutcome, ForwardError>> + Send;
}

/// Object-safe forwarder trait for use behind `Arc<dyn DynForwarder>`.
///
/// Implement [`Forwarder`] instead and rely on the blanket implementation.
#[async_trait]
pub trait DynForwarder: Send + Sync {
    /// Issue exactly one request downstream.
    async fn forward(&self, request: &ForwardRequest) -> Result<ForwardOutcome, ForwardError>;
}

#[async_trait]
impl<T: Forwarder + Sync> DynForwarder for T {
    async fn forward(&self, request: &ForwardRequest) -> Result<ForwardOutcome, ForwardError> {
        Forwarder::forward(self, request).await
    }
}
