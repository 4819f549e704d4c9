use std::sync::Arc;

use ik_agent::DialogueController;
use ik_domain::config::Config;
use ik_history::TurnStore;

/// Shared application state passed to all API handlers.
///
/// Everything here is immutable after bootstrap (the turn store only
/// appends); handlers share it by cheap `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub controller: Arc<DialogueController>,
    pub turns: Arc<TurnStore>,

    // ── Security (startup-resolved) ───────────────────────────────
    /// Webhook verify token from the configured env var.
    /// `None` = GET verification always fails.
    pub verify_token: Option<String>,
    /// Meta app secret for `X-Hub-Signature-256` checks.
    /// `None` = signature verification skipped.
    pub app_secret: Option<Vec<u8>>,
}
