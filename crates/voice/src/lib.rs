//! Voice synthesis for Confab.
//!
//! One synthesizer: the public Google Translate TTS endpoint (the same
//! one the gTTS library wraps). MP3 bytes are fetched per text chunk,
//! concatenated, and written under the configured audio directory.
//!
//! Synthesis is best-effort by contract: callers treat any error as
//! "no audio" and never surface it to the user.

pub mod gtts;

pub use gtts::GoogleTts;
