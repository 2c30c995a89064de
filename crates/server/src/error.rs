use skillrelay_http::HttpForwardError;
use thiserror::Error;

/// Errors that can occur when starting or running the skillrelay server.
///
/// Directive handling itself never fails; these cover startup and I/O only.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (binding the listener, or the server task failing).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The outbound HTTP client could not be built.
    #[error("forwarder error: {0}")]
    Forwarder(#[from] HttpForwardError),
}
