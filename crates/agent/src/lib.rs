//! The conversational core of Innkeeper.
//!
//! [`controller::DialogueController`] is the entry point: it builds the
//! conversation context, invokes the language model with the declared tool
//! schema, and dispatches any requested tool invocation to the
//! [`availability::AvailabilityResolver`] or [`details::DetailFormatter`]
//! before returning the user-facing reply.

pub mod availability;
pub mod context;
pub mod controller;
pub mod details;
pub mod llm;
pub mod toolset;

#[cfg(test)]
pub(crate) mod testing;

pub use availability::{AvailabilityQuery, AvailabilityResolver, Verdict, VerdictKind};
pub use context::ContextBuilder;
pub use controller::DialogueController;
pub use details::DetailFormatter;
pub use llm::{ChatRequest, ChatResponse, LlmClient, OpenAiChatClient};
