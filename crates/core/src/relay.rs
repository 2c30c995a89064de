use std::sync::Arc;

use serde_json::Value;
use tracing::{Level, debug, info, instrument, warn};

use crate::config::{RelayConfig, ResponseStrategy};
use crate::directive::{Validation, redacted, validate};
use crate::envelope::{ErrorType, ResponseEnvelope};
use crate::error::ForwardError;
use crate::forwarder::{DynForwarder, ForwardOutcome, ForwardRequest};

/// Relays smart-home directives to the downstream endpoint and turns the
/// outcome into a directive response.
///
/// Each call to [`handle`](Self::handle) is independent: the relay holds no
/// per-invocation state and can be shared behind an `Arc` across tasks.
pub struct DirectiveRelay {
    config: RelayConfig,
    forwarder: Arc<dyn DynForwarder>,
}

impl DirectiveRelay {
    /// Create a relay that forwards through the given forwarder.
    pub fn new(config: RelayConfig, forwarder: Arc<dyn DynForwarder>) -> Self {
        Self { config, forwarder }
    }

    /// Returns the configured response strategy.
    pub fn strategy(&self) -> ResponseStrategy {
        self.config.strategy
    }

    /// Handle one inbound event.
    ///
    /// Never fails: validation problems and downstream failures are both
    /// reported as `ErrorResponse` envelopes.
    #[instrument(skip(self, event), fields(strategy = %self.config.strategy))]
    pub async fn handle(&self, event: Value) -> ResponseEnvelope {
        if tracing::enabled!(Level::DEBUG) {
            let request = redacted(&event);
            debug!(request = %request, "directive received");
        }

        let envelope = match validate(event) {
            Validation::Respond(envelope) => envelope,
            Validation::Forward(directive) => {
                info!(namespace = %directive.namespace, "forwarding directive");
                let correlation_token = directive.correlation_token;
                let request =
                    ForwardRequest::new(&self.config.path, directive.token, directive.event)
                        .with_read_body(self.config.strategy.reads_body());
                let result = self.forwarder.forward(&request).await;
                self.respond(result, correlation_token)
            }
        };

        if tracing::enabled!(Level::DEBUG) {
            let response = envelope.clone().into_value();
            debug!(response = %response, "directive response");
        }
        envelope
    }

    /// Handle one inbound event and return the JSON sent back to the caller.
    pub async fn handle_value(&self, event: Value) -> Value {
        self.handle(event).await.into_value()
    }

    fn respond(
        &self,
        result: Result<ForwardOutcome, ForwardError>,
        correlation_token: Option<Value>,
    ) -> ResponseEnvelope {
        match (self.config.strategy, result) {
            (_, Err(err)) => {
                warn!(error = %err, "forwarding failed");
                ResponseEnvelope::error(ErrorType::InternalError, err.to_string())
            }
            (ResponseStrategy::Synchronous, Ok(ForwardOutcome::Body(body))) => {
                ResponseEnvelope::Direct(body)
            }
            // A forwarder that skipped the body still reported success; there
            // is nothing to pass through, so answer as if deferred.
            (ResponseStrategy::Synchronous, Ok(ForwardOutcome::Status(status))) => {
                warn!(status, "downstream body was not read");
                ResponseEnvelope::deferred(correlation_token)
            }
            (ResponseStrategy::Deferred, Ok(_)) => ResponseEnvelope::deferred(correlation_token),
        }
    }
}
