use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WhatsApp webhook channel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Environment variable holding the webhook verify token
    /// (echoed back during `GET` subscription verification).
    /// Empty = verification always fails (webhook effectively disabled).
    #[serde(default = "d_verify_env")]
    pub verify_token_env: String,
    /// Environment variable holding the Meta app secret used to check
    /// `X-Hub-Signature-256` on `POST` deliveries.
    /// If the env var is unset, signature verification is skipped.
    #[serde(default = "d_secret_env")]
    pub app_secret_env: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            verify_token_env: d_verify_env(),
            app_secret_env: d_secret_env(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_verify_env() -> String {
    "IK_WA_VERIFY_TOKEN".into()
}
fn d_secret_env() -> String {
    "IK_WA_APP_SECRET".into()
}
