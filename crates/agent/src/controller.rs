//! The tool-orchestrating dialogue controller — the top-level entry point
//! for one conversation turn.
//!
//! Per inbound message: build the context summary, invoke the model with
//! the declared tool schema, and either dispatch the requested tool to the
//! availability resolver / detail formatter or relay the model's direct
//! text. Every failure is caught at this boundary and turned into a reply
//! string — a turn is always answered, never dropped.

use std::sync::Arc;

use ik_directory::DirectoryProvider;
use ik_domain::config::LlmConfig;
use ik_domain::error::{Error, Result};
use ik_domain::tool::Message;
use ik_history::ConversationTurn;

use crate::availability::AvailabilityResolver;
use crate::context::ContextBuilder;
use crate::details::DetailFormatter;
use crate::llm::{ChatRequest, LlmClient};
use crate::toolset::{tool_definitions, ToolInvocation};

/// Fixed reply when the model produces neither text nor a usable tool call.
pub const NO_VALID_RESPONSE: &str = "No valid response received.";

/// Role and scope instructions for the dialogue model.
const SYSTEM_INSTRUCTIONS: &str = "\
You are a guest-support assistant for a short-term rental host. You help \
guests with questions about the properties: features, amenities, location, \
check-in and check-out times, and booking availability. Detect the guest's \
language and answer in that language, in a friendly, professional tone.\n\
\n\
Use the check_booking_availability tool to answer any availability \
question, and the get_property_details tool for questions about a \
property's attributes. Call at most one tool per message. Never invent \
availability or property facts — if a question is unrelated to the \
properties or bookings, politely steer the guest back to those topics.";

/// The top-level dialogue orchestrator. Stateless across messages except
/// via the persisted turn history supplied by the caller.
pub struct DialogueController {
    llm: Arc<dyn LlmClient>,
    resolver: AvailabilityResolver,
    details: DetailFormatter,
    context: ContextBuilder,
    model: String,
    temperature: f32,
    /// Host-provided notes prepended to the system instructions.
    knowledge_base: Option<String>,
}

impl DialogueController {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        directory: Arc<dyn DirectoryProvider>,
        cfg: &LlmConfig,
        knowledge_base: Option<String>,
    ) -> Self {
        Self {
            resolver: AvailabilityResolver::new(directory.clone()),
            details: DetailFormatter::new(directory),
            context: ContextBuilder::new(llm.clone(), cfg),
            llm,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            knowledge_base,
        }
    }

    /// Answer one inbound message. `history` is the conversant's recent
    /// turns, newest-first as stored. Infallible: errors become replies.
    pub async fn handle_message(
        &self,
        conversant_id: &str,
        text: &str,
        history: &[ConversationTurn],
    ) -> String {
        match self.run_turn(conversant_id, text, history).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(conversant_id, error = %e, "turn failed");
                format!("An error occurred: {e}")
            }
        }
    }

    async fn run_turn(
        &self,
        conversant_id: &str,
        text: &str,
        history: &[ConversationTurn],
    ) -> Result<String> {
        // 1. Rolling context (absent on summarization failure).
        let context = self.context.summarize(history).await;

        // 2. Compose the request.
        let mut system = String::new();
        if let Some(kb) = &self.knowledge_base {
            system.push_str("Knowledge base:\n");
            system.push_str(kb);
            system.push_str("\n\n");
        }
        system.push_str(SYSTEM_INSTRUCTIONS);
        if let Some(summary) = context.filter(|s| !s.is_empty()) {
            system.push_str("\n\nConversation so far: ");
            system.push_str(&summary);
        }
        let req = ChatRequest {
            messages: vec![Message::system(system), Message::user(text)],
            tools: tool_definitions(),
            temperature: Some(self.temperature),
            max_tokens: None,
            model: Some(self.model.clone()),
        };

        // 3. Invoke the model.
        let resp = self.llm.chat(&req).await?;
        if let Some(usage) = resp.usage {
            tracing::debug!(
                conversant_id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model turn"
            );
        }

        // 4. Branch on the response shape.
        if let Some(call) = resp.tool_calls.first() {
            tracing::info!(conversant_id, tool = %call.tool_name, "dispatching tool call");
            return self.dispatch(call).await;
        }

        let direct = resp.content.trim();
        if !direct.is_empty() {
            return Ok(direct.to_owned());
        }

        Ok(NO_VALID_RESPONSE.to_owned())
    }

    /// Execute a decoded tool invocation and render its structured result
    /// as the reply (no further natural-language wrapping).
    async fn dispatch(&self, call: &ik_domain::tool::ToolCall) -> Result<String> {
        let Some(invocation) = ToolInvocation::decode(call) else {
            return Ok(NO_VALID_RESPONSE.to_owned());
        };

        match invocation {
            ToolInvocation::CheckAvailability(query) => {
                let verdict = self.resolver.resolve(&query).await;
                Ok(render(&verdict)?)
            }
            ToolInvocation::PropertyDetails { property_id } => {
                match self.details.fetch(property_id.as_deref()).await {
                    // A single requested property renders as one object,
                    // the full catalog as a list.
                    Ok(details) if property_id.is_some() && details.len() == 1 => {
                        Ok(render(&details[0])?)
                    }
                    Ok(details) => Ok(render(&details)?),
                    Err(e) => {
                        // NotFound and upstream failures render as an
                        // error payload, never a crash.
                        Ok(render(&serde_json::json!({ "error": e.to_string() }))?)
                    }
                }
            }
        }
    }
}

fn render<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::Json)
}
