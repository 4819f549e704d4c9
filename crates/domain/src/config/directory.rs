use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Property directory connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the upstream property-management service.
///
/// The bearer token itself never lives in the config file; only the name
/// of the environment variable holding it does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the API bearer token.
    #[serde(default = "d_token_env")]
    pub api_token_env: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_retries: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_token_env: d_token_env(),
            timeout_ms: 10_000,
            max_retries: 3,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://public.api.hospitable.com/v2".into()
}
fn d_token_env() -> String {
    "IK_DIRECTORY_TOKEN".into()
}
fn d_10000() -> u64 {
    10_000
}
fn d_3() -> u32 {
    3
}
