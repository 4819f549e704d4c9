use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the OpenAI-compatible chat-completion endpoint used both
/// for answering guests and for summarizing conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_key_env")]
    pub api_key_env: String,
    /// Model used for the dialogue turns.
    #[serde(default = "d_model")]
    pub model: String,
    /// Model used for history summarization. Empty = same as `model`.
    #[serde(default)]
    pub summary_model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Output-token bound for the history summary call.
    #[serde(default = "d_summary_tokens")]
    pub summary_max_tokens: u32,
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
    /// Optional free-text knowledge-base file whose content is prepended
    /// to the system instructions (host notes, house policies, FAQ).
    #[serde(default)]
    pub knowledge_base_path: Option<std::path::PathBuf>,
}

impl LlmConfig {
    /// The model to use for summarization (falls back to the main model).
    pub fn summarizer(&self) -> &str {
        if self.summary_model.is_empty() {
            &self.model
        } else {
            &self.summary_model
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_key_env(),
            model: d_model(),
            summary_model: String::new(),
            temperature: d_temperature(),
            summary_max_tokens: d_summary_tokens(),
            timeout_ms: 30_000,
            knowledge_base_path: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_key_env() -> String {
    "IK_LLM_API_KEY".into()
}
fn d_model() -> String {
    "gpt-4o-mini".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_summary_tokens() -> u32 {
    256
}
fn d_30000() -> u64 {
    30_000
}
