//! Conversation-turn persistence for Innkeeper.
//!
//! One append-only JSONL file per conversant; the transport layer writes a
//! turn after each reply is computed, and the context builder reads the
//! most recent turns back when composing the next one.

pub mod store;

pub use store::{ConversationTurn, TurnStore};
