use std::fmt;

use serde::{Deserialize, Serialize};

/// Downstream path used when none is configured.
pub const DEFAULT_PATH: &str = "/hippoledlambda";

/// How the relay answers once the directive has been forwarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    /// Return the downstream body verbatim as the final response.
    #[default]
    Synchronous,
    /// Acknowledge with a `DeferredResponse`; the real result is delivered
    /// out of band by the downstream system.
    Deferred,
}

impl ResponseStrategy {
    /// Returns the strategy name as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synchronous => "synchronous",
            Self::Deferred => "deferred",
        }
    }

    /// Whether the downstream body must be read and parsed as JSON.
    pub fn reads_body(self) -> bool {
        matches!(self, Self::Synchronous)
    }
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a [`DirectiveRelay`](crate::DirectiveRelay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Path on the downstream host that directives are posted to.
    #[serde(default = "default_path")]
    pub path: String,

    /// Response strategy.
    #[serde(default)]
    pub strategy: ResponseStrategy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            strategy: ResponseStrategy::default(),
        }
    }
}

impl RelayConfig {
    /// Create a configuration with the default path and the given strategy.
    pub fn new(strategy: ResponseStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Set the downstream path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the response strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ResponseStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

fn default_path() -> String {
    DEFAULT_PATH.to_owned()
}
