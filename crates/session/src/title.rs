//! Topic title derivation.
//!
//! A title is the first 10 whitespace tokens of the first user message,
//! with an ellipsis when truncated. Pure function, recomputed on every
//! conversation update — the title always reflects the FIRST turn, never
//! the most recent one.

use confab_core::message::Turn;

/// Fallback title for empty conversations and blank first messages.
pub const TITLE_PLACEHOLDER: &str = "New chat";

const TITLE_WORD_LIMIT: usize = 10;

/// Derive a short human-readable label from a turn sequence.
pub fn derive_title(turns: &[Turn]) -> String {
    let Some(first) = turns.first() else {
        return TITLE_PLACEHOLDER.into();
    };

    let words: Vec<&str> = first.user.split_whitespace().collect();
    if words.is_empty() {
        return TITLE_PLACEHOLDER.into();
    }

    let mut title = words[..words.len().min(TITLE_WORD_LIMIT)].join(" ");
    if words.len() > TITLE_WORD_LIMIT {
        title.push('…');
    }
    title
}
