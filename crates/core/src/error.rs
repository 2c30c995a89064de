use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while forwarding a directive downstream.
///
/// The `Display` output of each variant is placed verbatim in the
/// `payload.message` of the resulting `ErrorResponse`, so the wording is part
/// of the external contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    /// The downstream endpoint answered with a status other than 200.
    ///
    /// `reason` is the reason phrase from the status line; it may be empty.
    #[error("Http Error: {}", status_line(.status, .reason))]
    HttpStatus { status: u16, reason: String },

    /// A network or transport-level error occurred (DNS, connect, reset).
    #[error("{0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The downstream body of a 200 response was not valid JSON.
    #[error("invalid downstream body: {0}")]
    InvalidBody(String),

    /// The outbound request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn status_line(status: impl std::fmt::Display, reason: &str) -> String {
    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}
