use std::time::Duration;

/// Downstream host used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://amsterdam.termors.net";

/// Configuration for the HTTP forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpForwarderConfig {
    /// Scheme and host of the downstream endpoint, without a path.
    pub base_url: String,

    /// Total request timeout. `None` keeps the transport default, which
    /// never times out on its own.
    pub timeout: Option<Duration>,

    /// Optional `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl Default for HttpForwarderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HttpForwarderConfig {
    /// Create a configuration targeting the given base URL, with no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Join the base URL with a request path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() || path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
