//! Core relay logic for skillrelay.
//!
//! Validates Smart Home API v3 directives, relays them downstream through a
//! [`Forwarder`], and builds the directive response the skill runtime expects.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use skillrelay_core::{
//!     DirectiveRelay, ForwardError, ForwardOutcome, ForwardRequest, Forwarder, RelayConfig,
//!     ResponseStrategy,
//! };
//!
//! struct Accepting;
//!
//! impl Forwarder for Accepting {
//!     async fn forward(&self, _request: &ForwardRequest) -> Result<ForwardOutcome, ForwardError> {
//!         Ok(ForwardOutcome::Status(200))
//!     }
//! }
//!
//! # async fn run(event: serde_json::Value) {
//! let relay = DirectiveRelay::new(
//!     RelayConfig::new(ResponseStrategy::Deferred),
//!     Arc::new(Accepting),
//! );
//! let response = relay.handle_value(event).await;
//! # }
//! ```

pub mod config;
pub mod directive;
pub mod envelope;
pub mod error;
pub mod forwarder;
pub mod relay;

pub use config::{DEFAULT_PATH, RelayConfig, ResponseStrategy};
pub use directive::{ValidatedDirective, Validation, validate};
pub use envelope::{DEFERRAL_SECONDS, ErrorType, ResponseEnvelope};
pub use error::ForwardError;
pub use forwarder::{DynForwarder, ForwardOutcome, ForwardRequest, Forwarder};
pub use relay::DirectiveRelay;
