//! Model backend implementations for Confab.
//!
//! Currently one backend: Ollama over its native REST API. The
//! conversation manager only sees the `ChatBackend` trait, so adding
//! an OpenAI-compatible endpoint later is a new module, not a rewrite.

pub mod ollama;

pub use ollama::OllamaBackend;
