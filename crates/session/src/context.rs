//! Context window assembly.
//!
//! Every model call sees the same deterministic layout:
//! 1. the persona system message;
//! 2. a second system message replaying the most recent stored turn
//!    pairs as a readable transcript (omitted when there is no history);
//! 3. the current UI session as alternating user/assistant messages;
//! 4. the new user message.
//!
//! Replayed history is flattened across ALL topics in store order —
//! global recency, not per-topic recency. Pairs are atomic: the window
//! never splits a user message from its reply.

use confab_core::message::{ChatMessage, Conversation, Turn};

/// How many recent turn pairs are replayed as context by default.
pub const RECENT_PAIR_LIMIT: usize = 50;

const MEMORY_BLOCK_LABEL: &str = "Here is a summary of past conversation turns:\n\n";

/// Builds the bounded context window for each backend call.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    persona: String,
    recent_limit: usize,
}

impl ContextBuilder {
    /// Create a builder with the given persona preamble.
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            recent_limit: RECENT_PAIR_LIMIT,
        }
    }

    /// Override how many recent pairs are replayed.
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Assemble the full message sequence for one backend call.
    ///
    /// Deterministic given the snapshot and session state; no randomness,
    /// no mid-pair truncation.
    pub fn build(
        &self,
        snapshot: &[Conversation],
        session: &[Turn],
        user_input: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(&self.persona)];

        if let Some(memory) = self.memory_block(snapshot) {
            messages.push(ChatMessage::system(memory));
        }

        for turn in session {
            messages.push(ChatMessage::user(&turn.user));
            messages.push(ChatMessage::assistant(&turn.assistant));
        }

        messages.push(ChatMessage::user(user_input));
        messages
    }

    /// Render the last `recent_limit` stored pairs as a transcript block,
    /// or `None` when there is no history at all.
    fn memory_block(&self, snapshot: &[Conversation]) -> Option<String> {
        let pairs: Vec<&Turn> = snapshot.iter().flat_map(|c| c.turns.iter()).collect();
        if pairs.is_empty() {
            return None;
        }

        let start = pairs.len().saturating_sub(self.recent_limit);
        let rendered: Vec<String> = pairs[start..]
            .iter()
            .map(|t| format!("User: {}\nAssistant: {}", t.user, t.assistant))
            .collect();

        Some(format!("{MEMORY_BLOCK_LABEL}{}", rendered.join("\n\n")))
    }
}
