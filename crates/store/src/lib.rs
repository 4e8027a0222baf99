//! Durable storage for Confab.
//!
//! Two independent artifacts, both plain files:
//! - the **conversations file** — a JSON array mirroring the full
//!   in-memory snapshot, rewritten after every mutation
//!   ([`ConversationStore`]);
//! - the **flat log** — an append-only JSONL record of individual
//!   (instruction, output) pairs for downstream reuse ([`FlatLog`]).
//!
//! The conversations file is the sole durability mechanism; there is no
//! write-ahead log or journal.

pub mod conversations;
pub mod flat_log;

pub use conversations::ConversationStore;
pub use flat_log::FlatLog;
