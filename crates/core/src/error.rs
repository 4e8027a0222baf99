//! Error types for the Confab domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Confab operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Voice errors ---
    #[error("Voice error: {0}")]
    Voice(#[from] VoiceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Faults from durable storage (the conversations file and the flat log).
///
/// Read faults are recovered locally by the store (missing or corrupt
/// content loads as an empty snapshot); write faults are reported so the
/// caller can at least log them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(String),
}

/// Faults from the chat model backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Faults from voice synthesis. The conversation manager masks these —
/// a failed synthesis means no audio artifact, never a user-facing error.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Synthesis request failed: {message} (status: {status_code})")]
    Http { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to write audio artifact: {0}")]
    Io(String),
}
