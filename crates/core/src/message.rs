//! Turn, Conversation, and chat message domain types.
//!
//! These are the core value objects that flow through the system:
//! the user sends a message → the session manager assembles context →
//! the backend generates a reply → the turn is recorded and persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (topic).
///
/// Stable for the conversation's lifetime; unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user message paired with the assistant's reply.
///
/// Serialized as a two-element array `[user, assistant]` so the
/// conversations file keeps the compact pair shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    /// What the user said
    pub user: String,

    /// What the assistant replied
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl From<(String, String)> for Turn {
    fn from((user, assistant): (String, String)) -> Self {
        Self { user, assistant }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.user, turn.assistant)
    }
}

/// The role of a message sender in the assembled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, memory block)
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl Role {
    /// The wire name used by chat APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message sent to the model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who this message speaks as
    pub role: Role,

    /// The text content
    pub content: String,
}

impl ChatMessage {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A named, ordered sequence of turns, independently persisted.
///
/// Invariants: `id` is unique across the store; `title` is never empty
/// (the title deriver falls back to a placeholder). Turns are replaced
/// wholesale on every update, never appended piecemeal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Derived title, recomputed on every update
    pub title: String,

    /// Ordered turns
    pub turns: Vec<Turn>,
}

impl Conversation {
    /// Create a new conversation with a fresh id.
    pub fn new(title: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            id: ConversationId::new(),
            title: title.into(),
            turns,
        }
    }
}
