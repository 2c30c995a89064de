use axum::Json;
use axum::extract::State;
use bytes::Bytes;
use serde_json::Value;
use tracing::warn;

use super::AppState;

/// `POST /directive` -- relay one smart-home directive and return its response.
///
/// Always answers `200`. A body that is not JSON is treated as an event
/// without a `directive` key, so the caller still gets an `ErrorResponse`.
pub async fn directive(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let event = serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!(error = %e, "inbound body is not JSON");
        Value::Null
    });

    Json(state.relay.handle_value(event).await)
}
