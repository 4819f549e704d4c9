use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8100")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Maximum in-flight HTTP requests before backpressure kicks in.
    #[serde(default = "d_max_concurrent")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8100,
            host: "127.0.0.1".into(),
            max_concurrent_requests: d_max_concurrent(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8100() -> u16 {
    8100
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_max_concurrent() -> usize {
    64
}
