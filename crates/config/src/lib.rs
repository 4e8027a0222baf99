//! Configuration loading, validation, and management for Confab.
//!
//! Loads configuration from `~/.confab/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.confab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default model
    #[serde(default = "default_model")]
    pub model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default max tokens per reply (None = backend default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Assistant identity configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Memory and storage configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Voice synthesis configuration
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_model() -> String {
    "llama3.2".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}

/// Who the assistant is and how it introduces itself to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// The assistant's display name
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// The persona system message sent at the head of every context window
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_assistant_name() -> String {
    "Confab".into()
}
fn default_persona() -> String {
    "You are Confab, a local AI assistant. You remember previous chats \
     and stay friendly and concise."
        .into()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            persona: default_persona(),
        }
    }
}

/// Where conversation history lives and how much of it is replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Data directory (default: ~/.confab/data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// How many recent turn pairs are replayed as context
    #[serde(default = "default_recent_pairs")]
    pub recent_pairs: usize,
}

fn default_recent_pairs() -> usize {
    50
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            recent_pairs: default_recent_pairs(),
        }
    }
}

/// Model backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
        }
    }
}

/// Voice synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Whether voice synthesis is available at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language tag passed to the synthesizer
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Where audio artifacts are written (default: {data_dir}/audio)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_dir: Option<PathBuf>,
}

fn default_lang() -> String {
    "en".into()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lang: default_lang(),
            audio_dir: None,
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    7341
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.confab/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `CONFAB_MODEL` — the model name
    /// - `CONFAB_OLLAMA_URL` — backend base URL
    /// - `CONFAB_DATA_DIR` — data directory
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("CONFAB_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("CONFAB_OLLAMA_URL") {
            config.backend.ollama_url = url;
        }
        if let Ok(dir) = std::env::var("CONFAB_DATA_DIR") {
            config.memory.data_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".confab")
    }

    /// The data directory holding the conversations file, flat log, and audio.
    pub fn data_dir(&self) -> PathBuf {
        self.memory
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("data"))
    }

    /// Path of the conversations file (the durable snapshot).
    pub fn conversations_path(&self) -> PathBuf {
        self.data_dir().join("conversations.json")
    }

    /// Path of the flat training log.
    pub fn flat_log_path(&self) -> PathBuf {
        self.data_dir().join("train.jsonl")
    }

    /// Directory where audio artifacts are written.
    pub fn audio_dir(&self) -> PathBuf {
        self.voice
            .audio_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("audio"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.recent_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "memory.recent_pairs must be at least 1".into(),
            ));
        }

        if self.assistant.persona.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "assistant.persona must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            assistant: AssistantConfig::default(),
            memory: MemoryConfig::default(),
            backend: BackendConfig::default(),
            voice: VoiceConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
