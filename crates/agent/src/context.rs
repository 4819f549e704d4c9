//! Conversation-context building.
//!
//! Reconstructs a role-tagged transcript from a conversant's recent turns
//! and compresses it into a short summary for injection into the next
//! turn's system context. History is a nice-to-have: every failure path
//! returns `None` so a turn is always answerable without it.

use std::sync::Arc;

use ik_domain::config::LlmConfig;
use ik_domain::tool::Message;
use ik_history::ConversationTurn;

use crate::llm::{ChatRequest, LlmClient};

/// Literal returned for a conversant with no stored turns. No model call
/// is made in that case.
pub const NO_PREVIOUS_MESSAGES: &str = "no previous messages";

/// Fixed summarization instruction. Booking facts — dates, property
/// identity, amenities, guest counts, house rules — are what follow-up
/// turns need to disambiguate, so they get called out explicitly.
const SUMMARY_INSTRUCTIONS: &str = "\
You summarize conversations between a guest and a booking assistant for \
short-term rental properties. Distinguish guest and assistant messages and \
keep every booking-relevant fact: property names and ids, cities, check-in \
and check-out dates, reservation status, number of guests, room details, \
amenities, house rules, and capacity. Drop greetings and pleasantries. Be \
concise and write in present tense.";

/// Builds the rolling conversational context for one conversant.
pub struct ContextBuilder {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

impl ContextBuilder {
    pub fn new(llm: Arc<dyn LlmClient>, cfg: &LlmConfig) -> Self {
        Self {
            llm,
            model: cfg.summarizer().to_owned(),
            max_tokens: cfg.summary_max_tokens,
        }
    }

    /// Condense the given turns (newest-first, as stored) into a short
    /// summary. Empty history yields the [`NO_PREVIOUS_MESSAGES`] literal
    /// without touching the network; a summarization failure yields
    /// `None`.
    pub async fn summarize(&self, turns: &[ConversationTurn]) -> Option<String> {
        if turns.is_empty() {
            return Some(NO_PREVIOUS_MESSAGES.to_owned());
        }

        let mut messages = vec![Message::system(SUMMARY_INSTRUCTIONS)];
        // Stored newest-first; the transcript reads oldest-first.
        for turn in turns.iter().rev() {
            messages.push(Message::user(&turn.text));
            if let Some(reply) = &turn.reply {
                messages.push(Message::assistant(reply));
            }
        }

        let req = ChatRequest {
            messages,
            tools: Vec::new(),
            temperature: Some(0.2),
            max_tokens: Some(self.max_tokens),
            model: Some(self.model.clone()),
        };

        match self.llm.chat(&req).await {
            Ok(resp) => {
                let summary = resp.content.trim().to_owned();
                if summary.is_empty() {
                    None
                } else {
                    Some(summary)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "history summarization failed; continuing without context");
                None
            }
        }
    }
}
