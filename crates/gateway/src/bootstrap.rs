//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use ik_agent::{DialogueController, OpenAiChatClient};
use ik_directory::RestDirectoryClient;
use ik_domain::config::{Config, ConfigSeverity};
use ik_history::TurnStore;

use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Secrets (read once at startup) ───────────────────────────────
    let directory_token = read_secret(&config.directory.api_token_env);
    if directory_token.is_none() {
        tracing::warn!(
            env = %config.directory.api_token_env,
            "directory API token not set — upstream calls will be unauthenticated"
        );
    }
    let llm_key = read_secret(&config.llm.api_key_env);
    if llm_key.is_none() {
        tracing::warn!(
            env = %config.llm.api_key_env,
            "LLM API key not set — model calls will be unauthenticated"
        );
    }
    let verify_token = read_secret(&config.whatsapp.verify_token_env);
    let app_secret = read_secret(&config.whatsapp.app_secret_env).map(String::into_bytes);
    if app_secret.is_none() {
        tracing::warn!("no WhatsApp app secret configured — webhook signatures are not verified");
    }

    // ── Upstream clients ─────────────────────────────────────────────
    let directory = Arc::new(
        RestDirectoryClient::new(&config.directory, directory_token)
            .context("initializing directory client")?,
    );
    tracing::info!(url = %config.directory.base_url, "directory client ready");

    let llm = Arc::new(
        OpenAiChatClient::from_config(&config.llm, llm_key).context("initializing LLM client")?,
    );
    tracing::info!(url = %config.llm.base_url, model = %config.llm.model, "LLM client ready");

    // ── Turn store ───────────────────────────────────────────────────
    std::fs::create_dir_all(&config.history.dir)
        .with_context(|| format!("creating history dir {}", config.history.dir.display()))?;
    let turns = Arc::new(TurnStore::new(&config.history.dir));

    // ── Knowledge base (optional) ────────────────────────────────────
    let knowledge_base = config.llm.knowledge_base_path.as_ref().and_then(|path| {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "knowledge base loaded");
                Some(content)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "knowledge base unreadable; continuing without");
                None
            }
        }
    });

    // ── Dialogue controller ──────────────────────────────────────────
    let controller = Arc::new(DialogueController::new(
        llm,
        directory,
        &config.llm,
        knowledge_base,
    ));

    Ok(AppState {
        config,
        controller,
        turns,
        verify_token,
        app_secret,
    })
}

/// Read a secret from the env var named in config. Empty names and empty
/// values both count as absent.
fn read_secret(env_name: &str) -> Option<String> {
    if env_name.is_empty() {
        return None;
    }
    std::env::var(env_name).ok().filter(|v| !v.is_empty())
}
