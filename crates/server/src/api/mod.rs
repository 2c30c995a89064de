pub mod directive;
pub mod health;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use skillrelay_core::DirectiveRelay;
use tower_http::trace::TraceLayer;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The directive relay.
    pub relay: Arc<DirectiveRelay>,
}

/// Build the Axum router with all routes and the request tracing layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/directive", post(directive::directive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
