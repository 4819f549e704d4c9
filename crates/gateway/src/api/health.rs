use axum::extract::State;
use axum::response::Json;

use crate::state::AppState;

/// `GET /healthz` — liveness probe.
pub async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.llm.model,
    }))
}
