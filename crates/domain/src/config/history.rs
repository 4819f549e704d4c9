use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation history
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding one append-only JSONL file per conversant.
    #[serde(default = "d_dir")]
    pub dir: PathBuf,
    /// How many recent turns feed the context summary.
    #[serde(default = "d_turns")]
    pub context_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: d_dir(),
            context_turns: d_turns(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_dir() -> PathBuf {
    PathBuf::from("./data/history")
}
fn d_turns() -> usize {
    6
}
