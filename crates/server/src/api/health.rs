use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::AppState;

/// `GET /health` -- returns service status and the active response strategy.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "strategy": state.relay.strategy().as_str(),
    }))
}
