//! Google Translate TTS synthesizer.
//!
//! `GET {endpoint}?ie=UTF-8&client=tw-ob&tl={lang}&q={chunk}` returns an
//! MP3 stream per chunk. The endpoint rejects long queries, so text is
//! split into whitespace-aligned chunks first; concatenated MP3 frames
//! play back as one continuous file.

use async_trait::async_trait;
use chrono::Utc;
use confab_core::error::VoiceError;
use confab_core::voice::VoiceSynthesizer;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest chunk the endpoint reliably accepts.
const MAX_CHUNK_CHARS: usize = 180;

/// Text-to-speech via the public Google Translate endpoint.
pub struct GoogleTts {
    endpoint: String,
    audio_dir: PathBuf,
    client: reqwest::Client,
}

impl GoogleTts {
    /// Create a synthesizer writing artifacts under `audio_dir`.
    pub fn new(audio_dir: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            audio_dir,
            client,
        }
    }

    /// Override the endpoint URL (used by tests to point at a stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Split text into chunks of at most [`MAX_CHUNK_CHARS`] characters,
    /// breaking only on whitespace so words are never cut. A single word
    /// longer than the limit becomes its own chunk.
    fn chunk_text(text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > MAX_CHUNK_CHARS {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    async fn fetch_chunk(&self, chunk: &str, lang: &str) -> Result<Vec<u8>, VoiceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(VoiceError::Http {
                status_code: status,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn artifact_path(audio_dir: &Path) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S%.3f");
        audio_dir.join(format!("reply-{stamp}.mp3"))
    }
}

#[async_trait]
impl VoiceSynthesizer for GoogleTts {
    fn name(&self) -> &str {
        "gtts"
    }

    async fn synthesize(&self, text: &str, lang: &str) -> Result<PathBuf, VoiceError> {
        let chunks = Self::chunk_text(text);
        if chunks.is_empty() {
            warn!("Nothing to synthesize, skipping");
            return Err(VoiceError::Io("empty text".into()));
        }

        let mut audio = Vec::new();
        for chunk in &chunks {
            let bytes = self.fetch_chunk(chunk, lang).await?;
            audio.extend_from_slice(&bytes);
        }

        std::fs::create_dir_all(&self.audio_dir)
            .map_err(|e| VoiceError::Io(e.to_string()))?;

        let path = Self::artifact_path(&self.audio_dir);
        std::fs::write(&path, &audio).map_err(|e| VoiceError::Io(e.to_string()))?;

        debug!(
            path = %path.display(),
            chunks = chunks.len(),
            bytes = audio.len(),
            "Audio artifact written"
        );
        Ok(path)
    }
}
