//! VoiceSynthesizer trait — the abstraction over text-to-speech.
//!
//! A synthesizer turns reply text into an audio artifact on disk and
//! returns its path. Synthesis is strictly best-effort: the conversation
//! manager converts any failure into "no audio" and moves on.

use crate::error::VoiceError;
use async_trait::async_trait;
use std::path::PathBuf;

/// The voice synthesis trait.
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// A human-readable name for this synthesizer (e.g., "gtts").
    fn name(&self) -> &str;

    /// Synthesize `text` in language `lang` (BCP-47-ish tag, e.g. "en")
    /// and return the path of the written audio artifact.
    async fn synthesize(
        &self,
        text: &str,
        lang: &str,
    ) -> std::result::Result<PathBuf, VoiceError>;
}
