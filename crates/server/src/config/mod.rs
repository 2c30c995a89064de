mod relay;
mod server;


pub use relay::*;
pub use server::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Environment variable overriding `relay.path`.
pub const PATH_ENV: &str = "SERVER_URI";

/// Environment variable overriding `relay.base_url`.
pub const BASE_URL_ENV: &str = "SKILLRELAY_BASE_URL";

/// Top-level configuration for the skillrelay server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct RelayServerConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Downstream relay configuration.
    #[serde(default)]
    pub relay: RelaySection,
}

impl RelayServerConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file, or use defaults if the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(path) = lookup(PATH_ENV) {
            self.relay.path = path;
        }
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.relay.base_url = base_url;
        }
    }
}
