use serde::Serialize;
use serde_json::{Map, Value, json};

/// Payload version stamped on every envelope this crate builds.
pub const PAYLOAD_VERSION: &str = "3";

/// Seconds the caller is told to wait for an out-of-band result.
pub const DEFERRAL_SECONDS: u64 = 7;

const DEFAULT_NAMESPACE: &str = "Alexa";
const AUTHORIZATION_NAMESPACE: &str = "Alexa.Authorization";

/// Error classification carried in `payload.type` of an `ErrorResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// The inbound event is not a usable directive.
    InvalidDirective,
    /// Anything else: unsupported version, downstream failure.
    InternalError,
}

impl ErrorType {
    /// Returns the wire name of this error type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDirective => "INVALID_DIRECTIVE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// A directive response, built once per invocation and never mutated.
///
/// Serializes to the `{"event": {"header": .., "payload": ..}}` shape the skill
/// runtime expects, except for [`ResponseEnvelope::Direct`], which is the
/// downstream body passed through without any wrapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Value")]
pub enum ResponseEnvelope {
    /// `ErrorResponse` with a type and a human-readable message.
    Error {
        error_type: ErrorType,
        message: String,
    },

    /// `AcceptGrant.Response` under the authorization namespace.
    AcceptGrant,

    /// `DeferredResponse` telling the caller the result arrives later.
    ///
    /// The correlation token is echoed exactly as the caller sent it.
    Deferred {
        correlation_token: Option<Value>,
        estimated_deferral_seconds: u64,
    },

    /// Downstream body returned verbatim.
    Direct(Value),
}

impl ResponseEnvelope {
    /// Build an `ErrorResponse`.
    pub fn error(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self::Error {
            error_type,
            message: message.into(),
        }
    }

    /// Build a `DeferredResponse` with the fixed deferral estimate.
    pub fn deferred(correlation_token: Option<Value>) -> Self {
        Self::Deferred {
            correlation_token,
            estimated_deferral_seconds: DEFERRAL_SECONDS,
        }
    }

    /// Returns `true` for `ErrorResponse` envelopes.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Convert into the JSON value returned to the caller.
    pub fn into_value(self) -> Value {
        match self {
            Self::Error {
                error_type,
                message,
            } => event(
                header(DEFAULT_NAMESPACE, "ErrorResponse", None),
                json!({ "type": error_type.as_str(), "message": message }),
            ),
            Self::AcceptGrant => event(
                header(AUTHORIZATION_NAMESPACE, "AcceptGrant.Response", None),
                Value::Object(Map::new()),
            ),
            Self::Deferred {
                correlation_token,
                estimated_deferral_seconds,
            } => event(
                header(DEFAULT_NAMESPACE, "DeferredResponse", correlation_token),
                json!({ "estimatedDeferralInSeconds": estimated_deferral_seconds }),
            ),
            Self::Direct(body) => body,
        }
    }
}

impl From<ResponseEnvelope> for Value {
    fn from(envelope: ResponseEnvelope) -> Self {
        envelope.into_value()
    }
}

fn header(namespace: &str, name: &str, correlation_token: Option<Value>) -> Value {
    let mut header = Map::new();
    header.insert("namespace".into(), Value::from(namespace));
    header.insert("name".into(), Value::from(name));
    header.insert("payloadVersion".into(), Value::from(PAYLOAD_VERSION));
    if let Some(token) = correlation_token {
        header.insert("correlationToken".into(), token);
    }
    Value::Object(header)
}

fn event(header: Value, payload: Value) -> Value {
    json!({ "event": { "header": header, "payload": payload } })
}
