//! HTTP forwarder for skillrelay.
//!
//! Implements [`Forwarder`](skillrelay_core::Forwarder) on top of `reqwest`,
//! posting each directive to the downstream endpoint with the caller's bearer
//! token.
//!
//! ```rust,no_run
//! use skillrelay_http::{HttpForwarder, HttpForwarderConfig};
//!
//! let config = HttpForwarderConfig::new("https://lights.example.com").with_timeout_secs(10);
//! let forwarder = HttpForwarder::new(config).expect("client should build");
//! ```

pub mod config;
pub mod error;
pub mod forwarder;

pub use config::{DEFAULT_BASE_URL, HttpForwarderConfig};
pub use error::HttpForwardError;
pub use forwarder::HttpForwarder;
