//! # Confab Core
//!
//! Domain types, traits, and error definitions for the Confab assistant.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators (the chat model backend and the voice
//! synthesizer) are defined as traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod voice;

// Re-export key types at crate root for ergonomics
pub use backend::{ChatBackend, ChatReply, ChatRequest, TokenUsage};
pub use error::{BackendError, Error, Result, StoreError, VoiceError};
pub use message::{ChatMessage, Conversation, ConversationId, Role, Turn};
pub use voice::VoiceSynthesizer;
