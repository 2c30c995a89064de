//! Inbound directive validation and field extraction.
//!
//! The event is kept as an opaque [`serde_json::Value`]; only the handful of
//! fields needed to route and authorize it are read. Everything else is
//! forwarded untouched.

use serde_json::Value;

use crate::envelope::{ErrorType, PAYLOAD_VERSION, ResponseEnvelope};

/// Lower-cased namespace that is answered locally with `AcceptGrant.Response`.
pub const AUTHORIZATION_NAMESPACE: &str = "alexa.authorization";

/// Lower-cased namespace whose token lives under `payload.scope.token`.
pub const DISCOVERY_NAMESPACE: &str = "alexa.discovery";

const REDACTED: &str = "[REDACTED]";

pub(crate) const MISSING_DIRECTIVE_MESSAGE: &str =
    "Missing key: directive, Is request a valid Alexa directive?";
pub(crate) const UNSUPPORTED_VERSION_MESSAGE: &str =
    "This skill only supports Smart Home API version 3";

/// A directive that passed validation and must be forwarded downstream.
#[derive(Clone, PartialEq)]
pub struct ValidatedDirective {
    /// `directive.header.namespace` as sent by the caller.
    pub namespace: String,
    /// Bearer token for the downstream call.
    pub token: String,
    /// `directive.header.correlationToken` exactly as the caller sent it.
    pub correlation_token: Option<Value>,
    /// The complete inbound event.
    pub event: Value,
}

impl std::fmt::Debug for ValidatedDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedDirective")
            .field("namespace", &self.namespace)
            .field("token", &REDACTED)
            .field("correlation_token", &self.correlation_token)
            .finish_non_exhaustive()
    }
}

/// Result of validating an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The directive must be relayed downstream.
    Forward(ValidatedDirective),
    /// The directive is answered locally with this envelope.
    Respond(ResponseEnvelope),
}

/// Validate an inbound event and extract what the relay needs from it.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. the event carries a `directive` key,
/// 2. `directive.header.payloadVersion` is `"3"`,
/// 3. authorization directives are answered with `AcceptGrant.Response`,
/// 4. the bearer token is read from `payload.scope.token` for discovery and
///    from `endpoint.scope.token` for everything else.
///
/// A missing namespace or token never aborts the invocation; it becomes an
/// `INVALID_DIRECTIVE` envelope naming the absent key.
pub fn validate(event: Value) -> Validation {
    let Some(directive) = event.get("directive") else {
        return respond_error(ErrorType::InvalidDirective, MISSING_DIRECTIVE_MESSAGE);
    };

    let header = directive.get("header");
    let version = header
        .and_then(|h| h.get("payloadVersion"))
        .and_then(Value::as_str);
    if version != Some(PAYLOAD_VERSION) {
        return respond_error(ErrorType::InternalError, UNSUPPORTED_VERSION_MESSAGE);
    }

    let Some(namespace) = header
        .and_then(|h| h.get("namespace"))
        .and_then(Value::as_str)
    else {
        return missing_key("directive.header.namespace");
    };
    let lowered = namespace.to_lowercase();

    if lowered == AUTHORIZATION_NAMESPACE {
        return Validation::Respond(ResponseEnvelope::AcceptGrant);
    }

    let token_path: [&str; 3] = if lowered == DISCOVERY_NAMESPACE {
        ["payload", "scope", "token"]
    } else {
        ["endpoint", "scope", "token"]
    };
    let Some(token) = lookup(directive, &token_path).and_then(Value::as_str) else {
        return missing_key(&format!("directive.{}", token_path.join(".")));
    };

    let correlation_token = header
        .and_then(|h| h.get("correlationToken"))
        .cloned();
    let namespace = namespace.to_owned();
    let token = token.to_owned();

    Validation::Forward(ValidatedDirective {
        namespace,
        token,
        correlation_token,
        event,
    })
}

/// Copy of `event` with both bearer token locations masked, for logging.
pub(crate) fn redacted(event: &Value) -> Value {
    let mut copy = event.clone();
    if let Some(directive) = copy.get_mut("directive") {
        for scope in ["endpoint", "payload"] {
            if let Some(token) = directive
                .get_mut(scope)
                .and_then(|v| v.get_mut("scope"))
                .and_then(|v| v.get_mut("token"))
            {
                *token = Value::from(REDACTED);
            }
        }
    }
    copy
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn respond_error(error_type: ErrorType, message: &str) -> Validation {
    Validation::Respond(ResponseEnvelope::error(error_type, message))
}

fn missing_key(path: &str) -> Validation {
    respond_error(ErrorType::InvalidDirective, &format!("Missing key: {path}"))
}
