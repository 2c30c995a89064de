use std::time::Duration;

use serde::Deserialize;
use skillrelay_core::{DEFAULT_PATH, RelayConfig, ResponseStrategy};
use skillrelay_http::{DEFAULT_BASE_URL, HttpForwarderConfig};

/// Downstream relay configuration.
///
/// # Example
///
/// ```toml
/// [relay]
/// base_url = "https://lights.example.com"
/// path = "/hippoledlambda"
/// strategy = "deferred"
/// timeout_seconds = 10
/// ```
#[derive(Debug, Deserialize)]
pub struct RelaySection {
    /// Scheme and host of the downstream endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path directives are posted to.
    #[serde(default = "default_path")]
    pub path: String,
    /// `"synchronous"` passes the downstream body through; `"deferred"`
    /// answers with a `DeferredResponse`.
    #[serde(default)]
    pub strategy: ResponseStrategy,
    /// Outbound request timeout. Unset means no timeout.
    pub timeout_seconds: Option<u64>,
    /// Optional `User-Agent` for outbound requests.
    pub user_agent: Option<String>,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            strategy: ResponseStrategy::default(),
            timeout_seconds: None,
            user_agent: None,
        }
    }
}

impl RelaySection {
    /// Relay configuration for the orchestrator.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig::new(self.strategy).with_path(self.path.clone())
    }

    /// Configuration for the outbound HTTP forwarder.
    pub fn forwarder_config(&self) -> HttpForwarderConfig {
        let mut config = HttpForwarderConfig::new(self.base_url.clone());
        if let Some(secs) = self.timeout_seconds {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_path() -> String {
    DEFAULT_PATH.to_owned()
}
