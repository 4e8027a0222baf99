//! Conversation memory and session orchestration for Confab.
//!
//! This crate is the stateful core of the assistant:
//! - [`context::ContextBuilder`] reconstructs the bounded context window
//!   sent to the model on every message;
//! - [`title::derive_title`] labels topics from their first turn;
//! - [`manager::ConversationManager`] runs the per-message state machine
//!   (context → backend → record update → persist → log → voice) and
//!   owns the in-memory snapshot of all conversations.

pub mod context;
pub mod manager;
pub mod title;

pub use context::{ContextBuilder, RECENT_PAIR_LIMIT};
pub use manager::{ConversationManager, TurnOutcome};
pub use title::{TITLE_PLACEHOLDER, derive_title};
