pub mod health;
pub mod webhook;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route(
            "/webhook/whatsapp",
            get(webhook::verify).post(webhook::receive),
        )
}
